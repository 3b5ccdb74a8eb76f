use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};

#[derive(Deserialize, Validate)]
/// Form data for registering a new client.
pub struct AddClientForm {
    #[validate(length(min = 1))]
    pub name: String,
    /// Primary notification address.
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub additional_emails: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl AddClientForm {
    pub fn to_new_client(&self) -> NewClient {
        NewClient::new(
            self.name.clone(),
            self.email.clone(),
            self.additional_emails.clone(),
            self.phone.clone(),
            self.address.clone(),
            self.notes.clone(),
        )
    }
}

#[derive(Deserialize, Validate)]
/// Form data for updating an existing client.
pub struct UpdateClientForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub additional_emails: Vec<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl From<&UpdateClientForm> for UpdateClient {
    fn from(form: &UpdateClientForm) -> Self {
        UpdateClient::new(
            form.name.clone(),
            form.email.clone(),
            form.additional_emails.clone(),
            form.phone.clone(),
            form.address.clone(),
            form.notes.clone(),
        )
    }
}
