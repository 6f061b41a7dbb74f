//! 韩语助词选择
//!
//! 根据前一个词最后一个字符是否带收音（받침）选择助词形态。

/// 助词类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Particle {
    /// 主格 이/가
    Subject,
    /// 主题 은/는
    Topic,
    /// 宾格 을/를
    Object,
    /// 方向 으로/로（ㄹ 收音取 로）
    Direction,
}

impl Particle {
    /// (闭音节形态, 开音节形态)
    fn forms(&self) -> (&'static str, &'static str) {
        match self {
            Particle::Subject => ("이", "가"),
            Particle::Topic => ("은", "는"),
            Particle::Object => ("을", "를"),
            Particle::Direction => ("으로", "로"),
        }
    }
}

const HANGUL_FIRST: u32 = 0xAC00;
const HANGUL_LAST: u32 = 0xD7A3;
const FINAL_COUNT: u32 = 28;
const FINAL_RIEUL: u32 = 8;

/// 最后一个字符的收音索引；非韩文音节返回 None
fn final_consonant(word: &str) -> Option<u32> {
    let last = word.chars().last()? as u32;
    if (HANGUL_FIRST..=HANGUL_LAST).contains(&last) {
        Some((last - HANGUL_FIRST) % FINAL_COUNT)
    } else {
        None
    }
}

/// 为 `word` 选择助词
///
/// 非韩文结尾（拉丁字母、数字、标点、空串）一律取开音节形态。
pub fn select_particle(word: &str, particle: Particle) -> &'static str {
    let (closed, open) = particle.forms();

    match final_consonant(word) {
        Some(0) | None => open,
        Some(FINAL_RIEUL) if particle == Particle::Direction => open,
        Some(_) => closed,
    }
}

/// 拼接词与助词
pub fn attach(word: &str, particle: Particle) -> String {
    format!("{}{}", word, select_particle(word, particle))
}
