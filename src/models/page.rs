//! 分页

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 200;

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// 分页参数（页码从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageQuery {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// 将越界参数收敛到合法范围
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 对已过滤的完整集合做内存分页
    pub fn paginate(items: Vec<T>, query: PageQuery) -> Self {
        let query = query.normalized();
        let total = items.len();
        let total_pages = total.div_ceil(query.page_size);
        let start = (query.page - 1).saturating_mul(query.page_size);

        let items = items
            .into_iter()
            .skip(start)
            .take(query.page_size)
            .collect();

        Self {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages,
        }
    }
}
