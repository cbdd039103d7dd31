use crate::element::UiAttributes;

/// Represents ways to locate a control on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Select by role and optional accessible name
    Role { role: String, name: Option<String> },
    /// Select by exact accessible label (the `aria-label` contract)
    Label(String),
    /// Select by visible text content, case-insensitive substring
    Text(String),
    /// Select by CSS class token
    ClassName(String),
    /// Chain multiple selectors, each scoped to the previous matches
    Chain(Vec<Selector>),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        // Handle chained selectors first
        let parts: Vec<&str> = s.split(">>").map(|p| p.trim()).collect();
        if parts.len() > 1 {
            return Selector::Chain(parts.into_iter().map(Selector::from).collect());
        }

        // role|name is the preferred precise format, e.g. "button|Save row"
        if s.contains('|') {
            let parts: Vec<&str> = s.split('|').collect();
            if parts.len() >= 2 {
                let role_part = parts[0].trim();
                let name_part = parts[1].trim();

                let role = role_part
                    .strip_prefix("role:")
                    .unwrap_or(role_part)
                    .to_string();
                let name = name_part
                    .strip_prefix("name:")
                    .unwrap_or(name_part)
                    .to_string();

                return Selector::Role {
                    role,
                    name: Some(name),
                };
            }
        }

        match s {
            "" => Selector::Invalid("empty selector".to_string()),
            _ if s.starts_with("role:") => Selector::Role {
                role: s[5..].trim().to_string(),
                name: None,
            },
            // Common control roles default to Role selectors
            "button" | "input" | "textfield" | "listbox" | "option" | "table" | "row" | "cell"
            | "document" => Selector::Role {
                role: s.to_string(),
                name: None,
            },
            _ if s.to_lowercase().starts_with("label:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::Label(parts[1].trim().to_string())
            }
            _ if s.to_lowercase().starts_with("text:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::Text(parts[1].trim().to_string())
            }
            _ if s.to_lowercase().starts_with("class:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::ClassName(parts[1].trim().to_string())
            }
            _ if s.to_lowercase().starts_with("classname:") => {
                let parts: Vec<&str> = s.splitn(2, ':').collect();
                Selector::ClassName(parts[1].trim().to_string())
            }
            // Visible text is the primary key in both target UIs
            _ => Selector::Text(s.to_string()),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

impl Selector {
    /// Whether a single element's attributes satisfy this selector.
    ///
    /// `Chain` never matches a single element; engines resolve chains by
    /// scoping each link to the previous link's matches.
    pub fn matches_attributes(&self, attrs: &UiAttributes) -> bool {
        match self {
            Selector::Role { role, name } => {
                if !attrs.role.eq_ignore_ascii_case(role) {
                    return false;
                }
                match name {
                    Some(wanted) => {
                        let wanted = wanted.to_lowercase();
                        let named = |s: &Option<String>| {
                            s.as_deref()
                                .map(|v| v.to_lowercase().contains(&wanted))
                                .unwrap_or(false)
                        };
                        named(&attrs.name) || named(&attrs.label) || named(&attrs.text)
                    }
                    None => true,
                }
            }
            Selector::Label(label) => attrs.label.as_deref() == Some(label.as_str()),
            Selector::Text(needle) => {
                let needle = needle.to_lowercase();
                attrs
                    .text
                    .as_deref()
                    .map(|t| t.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            }
            Selector::ClassName(class) => attrs
                .class_name
                .as_deref()
                .map(|c| c.split_whitespace().any(|token| token == class))
                .unwrap_or(false),
            Selector::Chain(_) | Selector::Invalid(_) => false,
        }
    }
}
