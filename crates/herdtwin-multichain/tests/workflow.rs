//! End-to-end mint-then-mirror workflow against scripted fake adapters.

use async_trait::async_trait;
use herdtwin_chains::{
    AdapterError, AdapterProvider, ChainAdapter, MintOutcome, NftInfoOutcome, TransferOutcome,
};
use herdtwin_core::{
    ChainFamily, EntityId, LivestockRecord, MetadataUri, MultichainError, Network, NetworkId,
    TokenId, TokenMetadata, TwinState, TxHash, WalletAddress,
};
use herdtwin_multichain::{
    MetadataStore, MultichainManager, MultichainNftService, NetworkMintResult,
};
use herdtwin_store::{
    AuditEventType, ConsistencyStore, MemoryAuditSink, MemoryConsistencyStore, MemoryNetworkStore,
    NetworkRegistry,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// ==================== fakes ====================

/// Adapter that replays a scripted queue of mint outcomes
struct ScriptedAdapter {
    network_id: NetworkId,
    script: Mutex<VecDeque<MintOutcome>>,
    mint_calls: Mutex<u32>,
}

impl ScriptedAdapter {
    fn new(network_id: NetworkId, outcomes: Vec<MintOutcome>) -> Self {
        Self {
            network_id,
            script: Mutex::new(outcomes.into()),
            mint_calls: Mutex::new(0),
        }
    }

    fn mint_calls(&self) -> u32 {
        *self.mint_calls.lock()
    }
}

#[async_trait]
impl ChainAdapter for ScriptedAdapter {
    fn network_id(&self) -> &NetworkId {
        &self.network_id
    }

    async fn mint_nft(
        &self,
        _metadata_uri: &MetadataUri,
        _to_address: &WalletAddress,
    ) -> Result<MintOutcome, AdapterError> {
        *self.mint_calls.lock() += 1;
        Ok(self.script.lock().pop_front().unwrap_or(MintOutcome::Rejected {
            error: "script exhausted".to_string(),
        }))
    }

    async fn transfer_nft(
        &self,
        _token_id: TokenId,
        _to_address: &WalletAddress,
    ) -> Result<TransferOutcome, AdapterError> {
        Ok(TransferOutcome::Rejected {
            error: "not scripted".to_string(),
        })
    }

    async fn nft_info(&self, _token_id: TokenId) -> Result<NftInfoOutcome, AdapterError> {
        Ok(NftInfoOutcome::Rejected {
            error: "not scripted".to_string(),
        })
    }
}

struct FakeProvider {
    adapters: HashMap<NetworkId, Arc<ScriptedAdapter>>,
}

#[async_trait]
impl AdapterProvider for FakeProvider {
    async fn adapter_for(&self, network: &Network) -> Result<Arc<dyn ChainAdapter>, AdapterError> {
        self.adapters
            .get(&network.id)
            .map(|a| Arc::clone(a) as Arc<dyn ChainAdapter>)
            .ok_or_else(|| AdapterError::Config {
                network: network.id.clone(),
                reason: "no adapter scripted".to_string(),
            })
    }
}

/// Metadata store that can be flipped into failure mode
struct FakeMetadataStore {
    fail: bool,
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUri, MultichainError> {
        if self.fail {
            return Err(MultichainError::MetadataUpload("pin API down".to_string()));
        }
        Ok(MetadataUri::new(format!("ipfs://fake-{}", metadata.name)))
    }
}

// ==================== fixture ====================

fn network(id: &str, family: ChainFamily, priority: u32) -> Network {
    Network {
        id: NetworkId::new(id),
        name: id.to_string(),
        family,
        chain_id: 1,
        rpc_url: "http://localhost:8545".to_string(),
        explorer_url_template: format!("https://{}.scan/tx/{{tx}}", id.to_lowercase()),
        native_currency: "ETH".to_string(),
        priority,
        is_active: true,
        is_testnet: true,
        config: HashMap::new(),
        config_version: 0,
    }
}

fn record(entity: &str) -> LivestockRecord {
    LivestockRecord {
        entity_id: EntityId::new(entity),
        ear_tag: format!("TAG-{}", entity),
        breed: "Hereford".to_string(),
        birth_date: None,
        health_status: "HEALTHY".to_string(),
        weight_kg: Some(380),
        owner_name: "campo-norte".to_string(),
        owner_wallet: WalletAddress::new("0x0000000000000000000000000000000000000007"),
        photo_url: None,
    }
}

fn minted(tx: &str, token: u64) -> MintOutcome {
    MintOutcome::Minted {
        transaction_hash: TxHash::new(tx),
        token_id: TokenId::new(token),
    }
}

struct Harness {
    service: MultichainNftService,
    manager: Arc<MultichainManager>,
    consistency: Arc<MemoryConsistencyStore>,
    audit: Arc<MemoryAuditSink>,
    adapters: HashMap<NetworkId, Arc<ScriptedAdapter>>,
}

/// Two EVM networks and one Starknet network; mint outcomes per network
fn harness(scripts: Vec<(&str, ChainFamily, u32, Vec<MintOutcome>)>, fail_metadata: bool) -> Harness {
    let store = Arc::new(MemoryNetworkStore::new());
    let mut adapters = HashMap::new();
    for (id, family, priority, outcomes) in scripts {
        store.upsert(network(id, family, priority));
        let network_id = NetworkId::new(id);
        adapters.insert(
            network_id.clone(),
            Arc::new(ScriptedAdapter::new(network_id, outcomes)),
        );
    }

    let registry = Arc::new(NetworkRegistry::new(store));
    let provider = Arc::new(FakeProvider {
        adapters: adapters.clone(),
    });
    let manager = Arc::new(MultichainManager::new(registry, provider));
    let consistency = Arc::new(MemoryConsistencyStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let service = MultichainNftService::new(
        Arc::clone(&manager),
        Arc::clone(&consistency) as Arc<dyn herdtwin_store::ConsistencyStore>,
        Arc::new(FakeMetadataStore { fail: fail_metadata }),
        Arc::clone(&audit) as Arc<dyn herdtwin_store::AuditSink>,
        "https://herdtwin.io",
        "https://herdtwin.io",
    );

    Harness {
        service,
        manager,
        consistency,
        audit,
        adapters,
    }
}

fn default_harness() -> Harness {
    harness(
        vec![
            ("POLYGON_AMOY", ChainFamily::Evm, 1, vec![minted("0xaaa1", 11)]),
            (
                "STARKNET_SEPOLIA",
                ChainFamily::Starknet,
                2,
                vec![minted("0xbbb2", 22)],
            ),
            ("ETHEREUM", ChainFamily::Evm, 3, vec![minted("0xccc3", 33)]),
        ],
        false,
    )
}

// ==================== tests ====================

#[tokio::test]
async fn test_register_then_mirror_then_duplicate_mirror() {
    let h = default_harness();
    let cow = record("BOV-001");

    // Register resolves the highest-priority active network
    let primary = h.service.register(&cow, None).await.unwrap();
    assert_eq!(primary.network_id.as_str(), "POLYGON_AMOY");
    assert_eq!(primary.token_id.value(), 11);
    assert_eq!(primary.transaction_hash.as_str(), "0xaaa1");

    let stark = NetworkId::new("STARKNET_SEPOLIA");
    let mirror = h.service.mirror(&cow, &stark).await.unwrap();
    assert_eq!(mirror.token_id.value(), 22);

    // Second mirror on the same pair is refused without chain traffic
    let err = h.service.mirror(&cow, &stark).await.unwrap_err();
    assert!(matches!(err, MultichainError::AlreadyMirrored { .. }));
    assert_eq!(err.code(), "ALREADY_MIRRORED");
    assert_eq!(h.adapters[&stark].mint_calls(), 1);

    let identity = h.consistency.identity(&cow.entity_id).unwrap();
    assert_eq!(identity.state(), TwinState::CrossChain);
    assert!(identity.last_sync_at.is_some());
}

#[tokio::test]
async fn test_failed_primary_mint_leaves_entity_untokenized() {
    let h = harness(
        vec![(
            "POLYGON_AMOY",
            ChainFamily::Evm,
            1,
            vec![MintOutcome::Rejected {
                error: "execution reverted: not minter".to_string(),
            }],
        )],
        false,
    );
    let cow = record("BOV-002");

    let err = h.service.register(&cow, None).await.unwrap_err();
    match &err {
        MultichainError::ChainExecution { message, .. } => {
            assert!(message.contains("not minter"));
        }
        other => panic!("expected ChainExecution, got {other:?}"),
    }
    assert_eq!(err.code(), "CHAIN_EXECUTION_ERROR");

    // Nothing persisted, but the failure left an audit record
    let identity = h.consistency.identity(&cow.entity_id).unwrap();
    assert_eq!(identity.state(), TwinState::Untokenized);
    let events = h.audit.events_for(&cow.entity_id);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, AuditEventType::MintFailed);
    assert!(events[0].transaction_hash.is_none());
}

#[tokio::test]
async fn test_second_register_is_rejected() {
    let h = default_harness();
    let cow = record("BOV-003");

    h.service.register(&cow, None).await.unwrap();
    let err = h.service.register(&cow, None).await.unwrap_err();
    assert!(matches!(err, MultichainError::AlreadyTokenized(_)));
}

#[tokio::test]
async fn test_mirror_guards() {
    let h = default_harness();
    let cow = record("BOV-004");
    let poly = NetworkId::new("POLYGON_AMOY");

    // Never registered
    let err = h.service.mirror(&cow, &poly).await.unwrap_err();
    assert!(matches!(err, MultichainError::IdentityNotFound(_)));

    // Registered but untokenized (identity row without a primary mint)
    h.consistency.ensure_identity(&cow.entity_id).unwrap();
    let err = h.service.mirror(&cow, &poly).await.unwrap_err();
    assert!(matches!(err, MultichainError::NoPrimaryNetwork(_)));

    // Mirroring onto the primary network
    h.service.register(&cow, None).await.unwrap();
    let err = h.service.mirror(&cow, &poly).await.unwrap_err();
    assert!(matches!(err, MultichainError::PrimaryNetworkConflict { .. }));
}

#[tokio::test]
async fn test_explicit_network_resolution() {
    let h = default_harness();
    let cow = record("BOV-005");

    let receipt = h
        .service
        .register(&cow, Some(&NetworkId::new("ETHEREUM")))
        .await
        .unwrap();
    assert_eq!(receipt.network_id.as_str(), "ETHEREUM");

    let err = h
        .service
        .register(&record("BOV-006"), Some(&NetworkId::new("UNKNOWN")))
        .await
        .unwrap_err();
    assert!(matches!(err, MultichainError::NetworkNotFound(_)));
}

#[tokio::test]
async fn test_explorer_url_carries_tx_hash_verbatim() {
    let h = default_harness();
    let cow = record("BOV-007");

    let receipt = h.service.register(&cow, None).await.unwrap();
    assert_eq!(
        receipt.explorer_url,
        "https://polygon_amoy.scan/tx/0xaaa1"
    );
    assert!(receipt.explorer_url.contains(receipt.transaction_hash.as_str()));
}

#[tokio::test]
async fn test_metadata_upload_failure_degrades_to_fallback() {
    let h = harness(
        vec![("POLYGON_AMOY", ChainFamily::Evm, 1, vec![minted("0xaaa1", 11)])],
        true,
    );
    let cow = record("BOV-008");

    // Register still succeeds; the URI is the content-hashed fallback
    let receipt = h.service.register(&cow, None).await.unwrap();
    assert!(receipt
        .metadata_uri
        .as_str()
        .starts_with("https://herdtwin.io/api/metadata/"));
}

#[tokio::test]
async fn test_fanout_collects_independent_results() {
    let h = harness(
        vec![
            ("POLYGON_AMOY", ChainFamily::Evm, 1, vec![minted("0xaaa1", 11)]),
            (
                "STARKNET_SEPOLIA",
                ChainFamily::Starknet,
                2,
                vec![MintOutcome::Rejected {
                    error: "insufficient max fee".to_string(),
                }],
            ),
            ("ETHEREUM", ChainFamily::Evm, 3, vec![minted("0xccc3", 33)]),
        ],
        false,
    );

    let targets = [
        NetworkId::new("POLYGON_AMOY"),
        NetworkId::new("STARKNET_SEPOLIA"),
        NetworkId::new("ETHEREUM"),
    ];
    let results = h
        .manager
        .mint_across_networks(
            &WalletAddress::new("0x0000000000000000000000000000000000000007"),
            &MetadataUri::new("ipfs://fake"),
            Some(&targets),
        )
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[&targets[0]].is_minted());
    assert!(results[&targets[2]].is_minted());
    match &results[&targets[1]] {
        NetworkMintResult::Failed { error } => assert!(error.contains("insufficient max fee")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fanout_defaults_to_top_priority_networks() {
    let h = default_harness();

    let results = h
        .manager
        .mint_across_networks(
            &WalletAddress::new("0x0000000000000000000000000000000000000007"),
            &MetadataUri::new("ipfs://fake"),
            None,
        )
        .await;

    // Two highest-priority active networks, not the whole fleet
    assert_eq!(results.len(), 2);
    assert!(results.contains_key(&NetworkId::new("POLYGON_AMOY")));
    assert!(results.contains_key(&NetworkId::new("STARKNET_SEPOLIA")));
}

#[tokio::test]
async fn test_fanout_reports_unknown_network() {
    let h = default_harness();
    let targets = [NetworkId::new("NOPE")];

    let results = h
        .manager
        .mint_across_networks(
            &WalletAddress::new("0x0000000000000000000000000000000000000007"),
            &MetadataUri::new("ipfs://fake"),
            Some(&targets),
        )
        .await;

    match &results[&targets[0]] {
        NetworkMintResult::Failed { error } => assert!(error.contains("NOPE")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_multichain_info_view() {
    let h = default_harness();
    let cow = record("BOV-009");

    h.service.register(&cow, None).await.unwrap();
    h.service
        .mirror(&cow, &NetworkId::new("STARKNET_SEPOLIA"))
        .await
        .unwrap();
    h.service
        .mirror(&cow, &NetworkId::new("ETHEREUM"))
        .await
        .unwrap();

    let info = h.service.multichain_info(&cow.entity_id).unwrap();
    assert_eq!(info.state, TwinState::CrossChain);
    assert!(info.is_cross_chain);
    assert_eq!(
        info.primary_network_id.as_ref().map(|n| n.as_str()),
        Some("POLYGON_AMOY")
    );
    assert_eq!(info.primary_token_id, Some(TokenId::new(11)));
    assert_eq!(info.mirrors.len(), 2);

    let stark = info
        .mirrors
        .iter()
        .find(|m| m.network_id.as_str() == "STARKNET_SEPOLIA")
        .unwrap();
    assert_eq!(stark.token_id.value(), 22);
    assert_eq!(
        stark.explorer_url.as_deref(),
        Some("https://starknet_sepolia.scan/tx/0xbbb2")
    );

    // Audit trail saw one primary and two mirrors
    let events = h.audit.events_for(&cow.entity_id);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].event_type, AuditEventType::PrimaryMinted);
    assert!(events[1..]
        .iter()
        .all(|e| e.event_type == AuditEventType::Mirrored));
}
