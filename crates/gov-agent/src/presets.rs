use crate::AgentError;
use gov_core::Parameter;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Longest preset name kept; longer names are cut.
pub const MAX_PRESET_NAME_LEN: usize = 79;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub parameter: Parameter,
}

/// Named parameters offered to the player. The newest preset comes first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetList {
    presets: Vec<Preset>,
}

impl PresetList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, parameter: Parameter) {
        let name = name.chars().take(MAX_PRESET_NAME_LEN).collect();
        self.presets.insert(0, Preset { name, parameter });
    }

    pub fn remove(&mut self, index: usize) -> Option<Preset> {
        (index < self.presets.len()).then(|| self.presets.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Index of the first preset with exactly this parameter.
    pub fn index_of(&self, parameter: &Parameter) -> Option<usize> {
        self.presets.iter().position(|p| p.parameter == *parameter)
    }

    /// Name of the matching preset, or "custom".
    pub fn short_description(&self, parameter: &Parameter) -> &str {
        self.index_of(parameter)
            .map(|i| self.presets[i].name.as_str())
            .unwrap_or("custom")
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, AgentError> {
        let mut list: PresetList = serde_yaml::from_str(text)?;
        for preset in &mut list.presets {
            if preset.name.chars().count() > MAX_PRESET_NAME_LEN {
                preset.name = preset.name.chars().take(MAX_PRESET_NAME_LEN).collect();
            }
        }
        Ok(list)
    }

    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, AgentError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gov_core::StatVec;

    fn food() -> Parameter {
        Parameter {
            factor: StatVec([10, 1, 1, 1, 1, 1]),
            ..Parameter::default()
        }
    }

    #[test]
    fn newest_first_and_lookup() {
        let mut list = PresetList::new();
        list.add("balanced", Parameter::default());
        list.add("max food", food());
        assert_eq!(list.get(0).unwrap().name, "max food");
        assert_eq!(list.short_description(&Parameter::default()), "balanced");
        let other = Parameter {
            require_happy: true,
            ..Parameter::default()
        };
        assert_eq!(list.short_description(&other), "custom");
        assert_eq!(list.remove(1).unwrap().name, "balanced");
        assert!(list.remove(5).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn long_names_are_cut() {
        let mut list = PresetList::new();
        list.add(&"x".repeat(200), food());
        assert_eq!(list.get(0).unwrap().name.len(), MAX_PRESET_NAME_LEN);
    }

    #[test]
    fn loads_yaml() {
        let yaml = r#"
- name: grow
  parameter:
    minimal_surplus: [1, 0, 0, 0, 0, 0]
    factor: [10, 1, 1, 1, 1, 1]
    happy_factor: 0
- name: celebrate
  parameter:
    minimal_surplus: [0, 0, 0, 0, 0, 0]
    factor: [1, 1, 1, 1, 1, 1]
    happy_factor: 5
    require_happy: true
"#;
        let list = PresetList::from_yaml_str(yaml).unwrap();
        assert_eq!(list.len(), 2);
        let celebrate = &list.get(1).unwrap().parameter;
        assert!(celebrate.require_happy && celebrate.allow_specialists);
        assert_eq!(list.short_description(celebrate), "celebrate");
        let back = PresetList::from_yaml_str(&list.to_yaml().unwrap()).unwrap();
        assert_eq!(back, list);
        assert!(PresetList::from_yaml_str("- name: 3").is_err());
    }
}
