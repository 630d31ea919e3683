//! Deterministic customer name generation from curated lists.

use crate::rng::SeedRng;

pub struct NameGenerator;

impl NameGenerator {
    /// Family name followed by given name.
    pub fn generate_full_name(rng: &mut SeedRng) -> String {
        let family = Self::pick(rng, Self::family_names());
        let given = Self::pick(rng, Self::given_names());
        format!("{} {}", family, given)
    }

    fn pick(rng: &mut SeedRng, names: &'static [&'static str]) -> &'static str {
        names[rng.index(names.len())]
    }

    fn family_names() -> &'static [&'static str] {
        &[
            "Wang", "Li", "Zhang", "Liu", "Chen", "Yang", "Huang", "Zhao", "Wu", "Zhou",
            "Xu", "Sun", "Ma", "Zhu", "Hu", "Guo", "He", "Lin", "Gao", "Luo",
            "Zheng", "Liang", "Xie", "Song", "Tang", "Han", "Feng", "Deng", "Cao", "Peng",
        ]
    }

    fn given_names() -> &'static [&'static str] {
        &[
            "Wei", "Fang", "Na", "Min", "Jing", "Lei", "Jun", "Yang", "Yong", "Yan",
            "Jie", "Tao", "Ming", "Chao", "Xiu", "Hua", "Ping", "Gang", "Hui", "Qiang",
            "Ling", "Bo", "Hao", "Xin", "Yu", "Lan", "Peng", "Kai", "Rui", "Ting",
        ]
    }
}
