//! NFT token metadata
//!
//! The metadata document uploaded to content-addressed storage and
//! referenced by every chain holding a token for the entity. Primary and
//! mirrors reference identical content, so the builder must be
//! deterministic for a given record.

use crate::record::LivestockRecord;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One attribute entry in the standard NFT metadata format
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenAttribute {
    pub trait_type: String,
    pub value: serde_json::Value,
}

/// NFT metadata document (OpenSea-compatible shape)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub external_url: String,
    pub background_color: String,
    pub attributes: Vec<TokenAttribute>,
}

impl TokenMetadata {
    /// Build the metadata document for a livestock record.
    ///
    /// `external_base` is the public site base URL, e.g.
    /// "https://herdtwin.io"; this layer treats it as opaque config.
    pub fn from_record(record: &LivestockRecord, external_base: &str) -> Self {
        let image = record.photo_url.clone().unwrap_or_else(|| {
            format!(
                "{}/static/images/breeds/{}.jpg",
                external_base,
                record.breed.to_lowercase().replace(' ', "-")
            )
        });

        Self {
            name: format!("Herdtwin NFT - {}", record.ear_tag),
            description: format!(
                "Digital twin of {} cattle with ear tag {}",
                record.breed, record.ear_tag
            ),
            image,
            external_url: format!("{}/animals/{}", external_base, record.entity_id),
            background_color: "ffffff".to_string(),
            attributes: vec![
                TokenAttribute {
                    trait_type: "Breed".to_string(),
                    value: json!(record.breed),
                },
                TokenAttribute {
                    trait_type: "Birth Date".to_string(),
                    value: json!(record
                        .birth_date
                        .map(|d| d.to_string())
                        .unwrap_or_default()),
                },
                TokenAttribute {
                    trait_type: "Health Status".to_string(),
                    value: json!(record.health_status),
                },
                TokenAttribute {
                    trait_type: "Current Weight".to_string(),
                    value: json!(record.weight_kg.unwrap_or(0)),
                },
                TokenAttribute {
                    trait_type: "Owner".to_string(),
                    value: json!(record.owner_name),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EntityId, WalletAddress};
    use chrono::NaiveDate;

    fn record() -> LivestockRecord {
        LivestockRecord {
            entity_id: EntityId::new("E1"),
            ear_tag: "AR-0042".to_string(),
            breed: "Angus".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2023, 4, 2),
            health_status: "HEALTHY".to_string(),
            weight_kg: Some(412),
            owner_name: "estancia-sur".to_string(),
            owner_wallet: WalletAddress::new("0x0000000000000000000000000000000000000001"),
            photo_url: None,
        }
    }

    #[test]
    fn test_metadata_attributes() {
        let meta = TokenMetadata::from_record(&record(), "https://herdtwin.io");

        assert_eq!(meta.name, "Herdtwin NFT - AR-0042");
        assert!(meta.description.contains("Angus"));
        assert_eq!(meta.external_url, "https://herdtwin.io/animals/E1");
        assert_eq!(meta.image, "https://herdtwin.io/static/images/breeds/angus.jpg");

        let breed = meta
            .attributes
            .iter()
            .find(|a| a.trait_type == "Breed")
            .unwrap();
        assert_eq!(breed.value, serde_json::json!("Angus"));

        let weight = meta
            .attributes
            .iter()
            .find(|a| a.trait_type == "Current Weight")
            .unwrap();
        assert_eq!(weight.value, serde_json::json!(412));
    }

    #[test]
    fn test_metadata_is_deterministic() {
        let a = TokenMetadata::from_record(&record(), "https://herdtwin.io");
        let b = TokenMetadata::from_record(&record(), "https://herdtwin.io");
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
