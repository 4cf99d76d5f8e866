use serde::{Deserialize, Serialize};

/// Icon shown for categories that were created without one.
pub const DEFAULT_CATEGORY_ICON: &str = "📝";

/// An expense category available to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: String,
    pub name: String,
    #[serde(rename = "emoji", default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

impl ExpenseCategory {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.map(str::to_string),
            color: None,
        }
    }

    pub fn icon(&self) -> &str {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => icon,
            _ => DEFAULT_CATEGORY_ICON,
        }
    }

    /// The label used in the category picker, e.g. `🍔 Food`.
    pub fn label(&self) -> String {
        format!("{} {}", self.icon(), self.name)
    }
}

/// A category that time entries can be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HobbyCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}
