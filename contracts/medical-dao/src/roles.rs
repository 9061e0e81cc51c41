//! Role registry.
//!
//! Maps `(Role, Address)` to a grant flag in persistent storage. Grants are
//! one-way: the contract exposes no revoke path, so a stakeholder stays a
//! stakeholder for the life of the DAO.

use soroban_sdk::{contracttype, Address, Env};

use crate::storage::{extend_persistent_ttl, DataKey};
use crate::Error;

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    /// Has contributed any amount to the pool.
    Contributor,
    /// Crossed the stakeholder threshold; may propose, vote and pay.
    Stakeholder,
}

pub fn has_role(env: &Env, who: &Address, role: Role) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Role(role, who.clone()))
        .unwrap_or(false)
}

pub fn grant_role(env: &Env, who: &Address, role: Role) {
    let key = DataKey::Role(role, who.clone());
    env.storage().persistent().set(&key, &true);
    extend_persistent_ttl(env, &key);
}

pub fn require_role(env: &Env, who: &Address, role: Role) -> Result<(), Error> {
    if !has_role(env, who, role) {
        return Err(Error::Unauthorized);
    }
    Ok(())
}
