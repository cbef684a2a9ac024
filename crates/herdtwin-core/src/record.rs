//! Inbound livestock record
//!
//! Supplied by the relational CRUD layer (outside this subsystem); this
//! layer only reads it to build token metadata and resolve the owner
//! wallet. Never mutated here.

use crate::types::{EntityId, WalletAddress};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Descriptive snapshot of one animal, the entity being tokenized
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LivestockRecord {
    /// Stable entity id, one per animal
    pub entity_id: EntityId,

    /// Identifying ear tag
    pub ear_tag: String,

    /// Breed name
    pub breed: String,

    /// Birth date if known
    pub birth_date: Option<NaiveDate>,

    /// Current health status ("HEALTHY", "SICK", ...)
    pub health_status: String,

    /// Current weight in kilograms
    pub weight_kg: Option<u32>,

    /// Owner display name
    pub owner_name: String,

    /// Wallet that receives the minted tokens
    pub owner_wallet: WalletAddress,

    /// Photo URL, if any; metadata falls back to a breed stock image
    pub photo_url: Option<String>,
}
