#[cfg(test)]
pub mod test {
    use crate::catalog::{
        Catalog, ChoiceSetting, DurationSetting, FactorSetting, Setting, SettingInfo,
        ToggleSetting,
    };

    fn info(path: &str) -> SettingInfo {
        SettingInfo::new(path, path, "")
    }

    pub fn duration(path: &str, min: i64, max: i64, normal: i64) -> Setting {
        Setting::Duration(DurationSetting {
            info: info(path),
            min_minutes: min,
            max_minutes: max,
            normal_minutes: normal,
        })
    }

    pub fn factor(path: &str, min: f64, max: f64, normal: f64, impact_weight: i32) -> Setting {
        Setting::Factor(FactorSetting {
            info: info(path),
            min,
            max,
            normal,
            impact_weight,
        })
    }

    pub fn choice(path: &str, options: &[&str], normal: &str) -> Setting {
        Setting::Choice(ChoiceSetting {
            info: info(path),
            options: options.iter().map(|o| o.to_string()).collect(),
            normal: normal.to_string(),
        })
    }

    pub fn toggle(path: &str, normal: bool) -> Setting {
        Setting::Toggle(ToggleSetting {
            info: info(path),
            normal,
        })
    }

    /// The full server catalog. Panics if it fails validation.
    pub fn server_catalog() -> Catalog {
        crate::enshrouded::catalog().expect("server catalog must validate")
    }

    #[test]
    fn server_catalog_builds() {
        let catalog = server_catalog();
        assert!(!catalog.settings().is_empty());
        assert_eq!(catalog.groups().len(), 6);
    }
}
