use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn short_label(label: &str) -> &str {
    label.rsplit('/').next().unwrap_or(label)
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

pub fn id_hash(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (ax, ay) = stable_pair("src/app.ts");
        let (bx, by) = stable_pair("src/app.ts");
        assert_eq!((ax, ay), (bx, by));
        assert!((-1.0..=1.0).contains(&ax) && (-1.0..=1.0).contains(&ay));

        let other = stable_pair("src/other.ts");
        assert_ne!((ax, ay), other);
    }

    #[test]
    fn short_label_strips_directories() {
        assert_eq!(short_label("src/components/App.tsx"), "App.tsx");
        assert_eq!(short_label("main.rs"), "main.rs");
    }
}
