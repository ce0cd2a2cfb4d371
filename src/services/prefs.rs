// src/services/prefs.rs
//
// Locally persisted viewer preferences: theme, the dismissed-hero flag and
// the favourites set. Each preference is an independently keyed JSON blob; a
// corrupt or missing blob falls back to its default and is never fatal.
use anyhow::Context;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

pub struct PrefsStore {
    dir: PathBuf,
    // Read-modify-write guard for the favourites toggle. Single writer by
    // design; concurrent processes racing the same blob are an accepted
    // limitation.
    lock: Mutex<()>,
}

impl PrefsStore {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating preferences directory {}", dir.display()))?;
        Ok(PrefsStore {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn read_blob<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.blob_path(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Corrupt preference blob {}: {}; using default", key, e);
                T::default()
            }
        }
    }

    fn write_blob<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)?;
        fs::write(self.blob_path(key), raw)
            .with_context(|| format!("writing preference blob {}", key))?;
        Ok(())
    }

    pub fn theme(&self) -> Theme {
        self.read_blob("theme")
    }

    pub fn set_theme(&self, theme: Theme) -> anyhow::Result<()> {
        self.write_blob("theme", &theme)
    }

    pub fn hero_dismissed(&self) -> bool {
        self.read_blob("hero_dismissed")
    }

    pub fn set_hero_dismissed(&self, dismissed: bool) -> anyhow::Result<()> {
        self.write_blob("hero_dismissed", &dismissed)
    }

    pub fn favourites(&self) -> HashSet<i64> {
        let ids: Vec<i64> = self.read_blob("favourites");
        ids.into_iter().collect()
    }

    /// Add the id if absent, remove it if present; returns the updated set.
    pub fn toggle_favourite(&self, id: i64) -> anyhow::Result<HashSet<i64>> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut favourites = self.favourites();
        if !favourites.insert(id) {
            favourites.remove(&id);
        }
        // Persist sorted so the blob is stable across writes.
        let mut ids: Vec<i64> = favourites.iter().copied().collect();
        ids.sort_unstable();
        self.write_blob("favourites", &ids)?;
        Ok(favourites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> PrefsStore {
        let dir = std::env::temp_dir().join(format!(
            "property_dashboard_prefs_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        PrefsStore::new(dir).unwrap()
    }

    #[test]
    fn favourites_round_trip_ignores_insertion_order() {
        let a = store("order_a");
        a.toggle_favourite(3).unwrap();
        a.toggle_favourite(1).unwrap();
        a.toggle_favourite(2).unwrap();

        let b = store("order_b");
        b.toggle_favourite(2).unwrap();
        b.toggle_favourite(3).unwrap();
        b.toggle_favourite(1).unwrap();

        assert_eq!(a.favourites(), b.favourites());
        assert_eq!(a.favourites(), [1, 2, 3].into_iter().collect());
    }

    #[test]
    fn toggle_removes_an_existing_favourite() {
        let s = store("toggle");
        s.toggle_favourite(7).unwrap();
        let set = s.toggle_favourite(7).unwrap();
        assert!(set.is_empty());
        assert!(s.favourites().is_empty());
    }

    #[test]
    fn corrupt_blob_falls_back_to_default() {
        let s = store("corrupt");
        fs::write(s.blob_path("favourites"), "{not json").unwrap();
        assert!(s.favourites().is_empty());

        fs::write(s.blob_path("theme"), "42").unwrap();
        assert_eq!(s.theme(), Theme::Light);
    }

    #[test]
    fn theme_and_hero_flag_persist() {
        let s = store("theme");
        assert_eq!(s.theme(), Theme::Light);
        s.set_theme(Theme::Dark).unwrap();
        assert_eq!(s.theme(), Theme::Dark);

        assert!(!s.hero_dismissed());
        s.set_hero_dismissed(true).unwrap();
        assert!(s.hero_dismissed());
    }
}
