use tracing::info;

use parley_types::models::{Admin, User};

use crate::{Ledger, LedgerError};

impl Ledger {
    // -- Users --

    pub fn create_user(&self, id: i64) -> Result<User, LedgerError> {
        let user = self.with_state(|state| {
            if state.users.contains_key(&id) {
                return Err(LedgerError::UserExists(id));
            }
            let user = User { id };
            state.users.insert(id, user);
            Ok(user)
        })?;
        info!("Registered user {}", id);
        Ok(user)
    }

    pub fn user(&self, id: i64) -> Result<User, LedgerError> {
        self.with_state(|state| {
            state
                .users
                .get(&id)
                .copied()
                .ok_or(LedgerError::UserNotFound(id))
        })
    }

    // -- Admins --

    pub fn create_admin(&self, id: i64) -> Result<Admin, LedgerError> {
        let admin = self.with_state(|state| {
            if state.admins.contains_key(&id) {
                return Err(LedgerError::AdminExists(id));
            }
            let admin = Admin { id };
            state.admins.insert(id, admin);
            Ok(admin)
        })?;
        info!("Registered admin {}", id);
        Ok(admin)
    }

    pub fn admin(&self, id: i64) -> Result<Admin, LedgerError> {
        self.with_state(|state| {
            state
                .admins
                .get(&id)
                .copied()
                .ok_or(LedgerError::AdminNotFound(id))
        })
    }

    /// All admins, ordered by id.
    pub fn admins(&self) -> Result<Vec<Admin>, LedgerError> {
        self.with_state(|state| Ok(state.admins.values().copied().collect()))
    }
}
