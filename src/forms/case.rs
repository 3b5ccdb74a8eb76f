use serde::Deserialize;
use validator::Validate;

use crate::domain::case::{CaseStatus, NewCase, UpdateCase};

#[derive(Deserialize, Validate)]
/// Form data for opening a new case under a client.
pub struct AddCaseForm {
    #[validate(length(min = 1))]
    pub client_id: String,
    #[validate(length(min = 1))]
    pub case_number: String,
    pub case_name: Option<String>,
    pub description: Option<String>,
    /// Defaults to Pending when absent.
    pub status: Option<String>,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
}

impl AddCaseForm {
    pub fn to_new_case(&self) -> NewCase {
        NewCase::new(
            self.client_id.clone(),
            self.case_number.clone(),
            self.case_name.clone(),
            self.description.clone(),
            self.status
                .as_deref()
                .map(CaseStatus::from)
                .unwrap_or_default(),
            self.home_address.clone(),
            self.work_address.clone(),
        )
    }
}

#[derive(Deserialize, Validate)]
/// Form data for updating a case; absent fields are left untouched.
pub struct UpdateCaseForm {
    pub case_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub home_address: Option<String>,
    pub work_address: Option<String>,
}

impl From<&UpdateCaseForm> for UpdateCase {
    fn from(form: &UpdateCaseForm) -> Self {
        UpdateCase {
            case_name: form.case_name.clone(),
            description: form.description.clone(),
            status: form.status.as_deref().map(CaseStatus::from),
            home_address: form.home_address.clone(),
            work_address: form.work_address.clone(),
        }
    }
}
