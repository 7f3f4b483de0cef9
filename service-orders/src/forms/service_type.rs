//! Service type form

use super::{optional, required};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTypeForm {
    pub name: String,
    pub description: String,
}

/// A validated service type
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceTypeInput {
    pub name: String,
    pub description: Option<String>,
}

impl ServiceTypeForm {
    pub fn validate(&self) -> Result<ServiceTypeInput> {
        Ok(ServiceTypeInput {
            name: required("name", &self.name)?,
            description: optional(&self.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_required() {
        assert!(ServiceTypeForm::default().validate().is_err());

        let input = ServiceTypeForm {
            name: " Instalação ".into(),
            description: "".into(),
        }
        .validate()
        .unwrap();

        assert_eq!(input.name, "Instalação");
        assert_eq!(input.description, None);
    }
}
