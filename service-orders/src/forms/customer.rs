//! Customer form

use super::{optional, required};
use crate::database::CustomerInput;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Customer fields as typed by the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub name: String,
    pub tax_id: String,
    pub phone: String,
    pub email: String,
    pub street: String,
    pub number: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl CustomerForm {
    /// Name is required; every other field is trimmed and dropped when blank
    pub fn validate(&self) -> Result<CustomerInput> {
        Ok(CustomerInput {
            name: required("name", &self.name)?,
            tax_id: optional(&self.tax_id),
            phone: optional(&self.phone),
            email: optional(&self.email),
            street: optional(&self.street),
            number: optional(&self.number),
            complement: optional(&self.complement),
            neighborhood: optional(&self.neighborhood),
            city: optional(&self.city),
            state: optional(&self.state),
            postal_code: optional(&self.postal_code),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_blank_name_rejected() {
        let form = CustomerForm {
            name: "   ".into(),
            ..Default::default()
        };

        assert!(matches!(
            form.validate(),
            Err(AppError::Validation { field: "name", .. })
        ));
    }

    #[test]
    fn test_fields_trimmed() {
        let form = CustomerForm {
            name: " Maria Souza ".into(),
            tax_id: "".into(),
            city: " Natal".into(),
            ..Default::default()
        };

        let input = form.validate().unwrap();

        assert_eq!(input.name, "Maria Souza");
        assert_eq!(input.tax_id, None);
        assert_eq!(input.city.as_deref(), Some("Natal"));
    }
}
