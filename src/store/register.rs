//! Registration slice.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

/// Registration status. `is_registered` only goes back to false on [`RegisterAction::Reset`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationStatus {
    pub is_registered: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegisterAction {
    Pending,
    Fulfilled,
    Rejected { message: String },
    ClearError,
    Reset,
}

impl RegistrationStatus {
    pub(crate) fn reduce(&mut self, action: RegisterAction) {
        match action {
            RegisterAction::Pending => {
                self.is_loading = true;
                self.error = None;
            }
            RegisterAction::Fulfilled => {
                self.is_loading = false;
                self.is_registered = true;
            }
            RegisterAction::Rejected { message } => {
                self.is_loading = false;
                self.error = Some(message);
            }
            RegisterAction::ClearError => self.error = None,
            RegisterAction::Reset => *self = Self::default(),
        }
    }
}
