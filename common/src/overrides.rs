//! 手動マッピング
//!
//! 自動照合が苦手なカテゴリを、照合先IDへ直接割り当てる表。
//! キーは照合元のID、または正規化したラベル。

use crate::error::Result;
use crate::normalizer::normalize;
use crate::types::CategoryLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 照合元キー → 照合先ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualOverrides {
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
}

impl ManualOverrides {
    /// 組み込みプリセットを取得
    pub fn from_preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "overture-foursquare" | "overture" | "om-fsq" => Some(Self::overture_foursquare_preset()),
            _ => None,
        }
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// JSON文字列から読み込み
    ///
    /// `{"mappings": {...}}` と、キーと値だけの平たいオブジェクトの両方を受け付ける。
    pub fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Wrapped { mappings: BTreeMap<String, String> },
            Flat(BTreeMap<String, String>),
        }

        let mappings = match serde_json::from_str::<Repr>(json)? {
            Repr::Wrapped { mappings } => mappings,
            Repr::Flat(mappings) => mappings,
        };
        let mut overrides = Self::default();
        for (key, target_id) in mappings {
            overrides.insert(&key, target_id);
        }
        Ok(overrides)
    }

    /// JSON文字列として出力
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 追加（ラベルは正規化してから格納）
    pub fn insert(&mut self, key: &str, target_id: impl Into<String>) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        let normalized = normalize(key);
        let key = if normalized.is_empty() { key.to_string() } else { normalized };
        self.mappings.insert(key, target_id.into());
    }

    /// 別の表をマージ（後から渡した方が優先）
    pub fn merge(&mut self, other: &ManualOverrides) {
        for (key, target_id) in &other.mappings {
            self.mappings.insert(key.clone(), target_id.clone());
        }
    }

    /// 照合元ラベルの割り当て先を検索（ID → 正規化ラベルの順）
    pub fn lookup(&self, source: &CategoryLabel) -> Option<&str> {
        let id = source.id.trim();
        if !id.is_empty() {
            if let Some(target_id) = self.mappings.get(id) {
                return Some(target_id.as_str());
            }
            let normalized_id = normalize(id);
            if let Some(target_id) = self.mappings.get(&normalized_id) {
                return Some(target_id.as_str());
            }
        }
        let normalized = normalize(&source.label);
        if normalized.is_empty() {
            return None;
        }
        self.mappings.get(&normalized).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Overture Maps → Foursquare 用プリセット
    fn overture_foursquare_preset() -> Self {
        let mut config = Self::default();

        // 飲食
        config.insert("thai_restaurant", "4bf58dd8d48988d149941735");
        config.insert("chinese_restaurant", "4bf58dd8d48988d145941735");
        config.insert("italian_restaurant", "4bf58dd8d48988d110941735");
        config.insert("mexican_restaurant", "4bf58dd8d48988d1c1941735");
        config.insert("indian_restaurant", "4bf58dd8d48988d10f941735");
        config.insert("japanese_restaurant", "4bf58dd8d48988d111941735");
        config.insert("french_restaurant", "4bf58dd8d48988d10c941735");
        config.insert("american_restaurant", "4bf58dd8d48988d14e941735");
        config.insert("korean_restaurant", "4bf58dd8d48988d113941735");
        config.insert("vietnamese_restaurant", "4bf58dd8d48988d14a941735");
        config.insert("pizza_restaurant", "4bf58dd8d48988d1ca941735");
        config.insert("burger_restaurant", "4bf58dd8d48988d16c941735");
        config.insert("sandwich_shop", "4bf58dd8d48988d1c5941735");
        config.insert("coffee_shop", "4bf58dd8d48988d1e0931735");
        config.insert("bakery", "4bf58dd8d48988d16a941735");
        config.insert("bar", "4bf58dd8d48988d116941735");
        config.insert("restaurant", "4bf58dd8d48988d1c4941735");
        config.insert("fast_food_restaurant", "4bf58dd8d48988d16e941735");

        // 医療
        config.insert("general_dentistry", "4bf58dd8d48988d177941735");
        config.insert("hospital", "4bf58dd8d48988d196941735");
        config.insert("pharmacy", "4bf58dd8d48988d10f951735");
        config.insert("doctor", "4bf58dd8d48988d177941735");
        config.insert("dentist", "4bf58dd8d48988d177941735");
        config.insert("veterinarian", "4bf58dd8d48988d100951735");
        config.insert("urgent_care_clinic", "4bf58dd8d48988d196941735");

        // 小売
        config.insert("grocery_store", "4bf58dd8d48988d118951735");
        config.insert("convenience_store", "4bf58dd8d48988d1f6931735");
        config.insert("supermarket", "4bf58dd8d48988d118951735");
        config.insert("department_store", "4bf58dd8d48988d1f7931735");
        config.insert("clothing_store", "4bf58dd8d48988d103951735");
        config.insert("shoe_store", "4bf58dd8d48988d107951735");
        config.insert("bookstore", "4bf58dd8d48988d114951735");
        config.insert("hardware_store", "4bf58dd8d48988d112951735");
        config.insert("toy_store", "4bf58dd8d48988d1f3931735");

        // 娯楽
        config.insert("movie_theater", "4bf58dd8d48988d17f941735");
        config.insert("cinema", "4bf58dd8d48988d17f941735");
        config.insert("gym", "4bf58dd8d48988d175941735");
        config.insert("museum", "4bf58dd8d48988d181941735");
        config.insert("zoo", "4bf58dd8d48988d17b941735");
        config.insert("park", "4bf58dd8d48988d163941735");
        config.insert("library", "4bf58dd8d48988d12f941735");
        config.insert("casino", "4bf58dd8d48988d17c941735");
        config.insert("bowling_alley", "4bf58dd8d48988d1e4931735");

        // 交通
        config.insert("airport", "4bf58dd8d48988d1ed931735");
        config.insert("bus_station", "4bf58dd8d48988d1fe931735");
        config.insert("train_station", "4bf58dd8d48988d129941735");
        config.insert("gas_station", "4bf58dd8d48988d113951735");

        // サービス
        config.insert("bank", "4bf58dd8d48988d10a951735");
        config.insert("atm", "4bf58dd8d48988d10b951735");
        config.insert("post_office", "4bf58dd8d48988d172941735");
        config.insert("hotel", "4bf58dd8d48988d1fa931735");
        config.insert("school", "4bf58dd8d48988d13b941735");
        config.insert("university", "4bf58dd8d48988d1ae941735");

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaxonomySource;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source(id: &str, label: &str) -> CategoryLabel {
        CategoryLabel::new(TaxonomySource::Source, id, label)
    }

    #[test]
    fn test_preset_lookup_by_label() {
        let overrides = ManualOverrides::from_preset("overture-foursquare").unwrap();
        assert_eq!(
            overrides.lookup(&source("1", "coffee_shop")),
            Some("4bf58dd8d48988d1e0931735")
        );
        // 表記が違っても正規化後に一致すれば当たる
        assert_eq!(
            overrides.lookup(&source("2", "Coffee Shop")),
            Some("4bf58dd8d48988d1e0931735")
        );
        assert_eq!(overrides.lookup(&source("3", "Pizza Restaurant")), Some("4bf58dd8d48988d1ca941735"));
        assert_eq!(overrides.lookup(&source("4", "mystery spot")), None);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(ManualOverrides::from_preset("nope").is_none());
    }

    #[test]
    fn test_lookup_by_id_first() {
        let mut overrides = ManualOverrides::default();
        overrides.insert("src-42", "T1");
        overrides.insert("coffee shop", "T2");
        assert_eq!(overrides.lookup(&source("src-42", "coffee shop")), Some("T1"));
        assert_eq!(overrides.lookup(&source("other", "coffee shop")), Some("T2"));
    }

    #[test]
    fn test_from_json_both_shapes() {
        let wrapped = ManualOverrides::from_json(r#"{"mappings": {"Bank": "B1"}}"#).unwrap();
        assert_eq!(wrapped.lookup(&source("", "bank")), Some("B1"));

        let flat = ManualOverrides::from_json(r#"{"atm": "A1"}"#).unwrap();
        assert_eq!(flat.lookup(&source("", "ATM")), Some("A1"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(ManualOverrides::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_merge_later_wins() {
        let mut base = ManualOverrides::default();
        base.insert("bank", "B1");
        base.insert("atm", "A1");
        let mut extra = ManualOverrides::default();
        extra.insert("bank", "B2");
        base.merge(&extra);
        assert_eq!(base.len(), 2);
        assert_eq!(base.lookup(&source("", "bank")), Some("B2"));
        assert_eq!(base.lookup(&source("", "atm")), Some("A1"));
    }

    #[test]
    fn test_from_file_and_to_json() {
        let mut overrides = ManualOverrides::default();
        overrides.insert("Museum", "M1");
        let json = overrides.to_json().unwrap();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        let loaded = ManualOverrides::from_file(file.path()).unwrap();
        assert_eq!(loaded, overrides);
        assert_eq!(loaded.lookup(&source("", "museum")), Some("M1"));
    }

    #[test]
    fn test_blank_key_ignored() {
        let mut overrides = ManualOverrides::default();
        overrides.insert("   ", "X");
        assert!(overrides.is_empty());
    }
}
