//! Encrypted snapshot codec: the only place key material touches data.
//!
//! Wire format: `MAGIC (4 bytes) || nonce (12 bytes) || ciphertext (includes
//! 16-byte GCM tag)`. The magic doubles as AEAD associated data, so a header
//! swap fails authentication.
//!
//! The plaintext is the JSON of a versioned snapshot listing every node in
//! insertion order with all of its fields. Decoding needs nothing beyond the
//! shared key.
//!
//! # Determinism
//!
//! The nonce is derived from the plaintext with a keyed blake3 hash, so
//! [`serialize`] is a pure function of (graph, key): the same graph always
//! encrypts to the same bytes and therefore to the same content hash. A nonce
//! can only repeat for an identical plaintext, which then produces an
//! identical ciphertext.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use vaultgraph_core::{Node, NodeGraph};

use crate::error::StorageError;
use crate::key::SymmetricKey;

/// Header identifying a vaultgraph snapshot, format revision 1.
pub const MAGIC: &[u8; 4] = b"VGR1";

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// blake3 context string for the nonce-derivation subkey.
const NONCE_CONTEXT: &str = "vaultgraph 2024 snapshot nonce v1";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    nodes: Vec<&'a Node>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<Node>,
}

fn cipher(key: &SymmetricKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

fn derive_nonce(key: &SymmetricKey, plaintext: &[u8]) -> [u8; NONCE_LEN] {
    let subkey = blake3::derive_key(NONCE_CONTEXT, key.as_bytes());
    let digest = blake3::keyed_hash(&subkey, plaintext);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest.as_bytes()[..NONCE_LEN]);
    nonce
}

/// Encrypts the whole graph under `key`.
pub fn serialize(graph: &NodeGraph, key: &SymmetricKey) -> Result<Vec<u8>, StorageError> {
    let plaintext = serde_json::to_vec(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        nodes: graph.all_nodes().collect(),
    })?;

    let nonce = derive_nonce(key, &plaintext);
    let ciphertext = cipher(key)
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: &plaintext,
                aad: MAGIC,
            },
        )
        .map_err(|e| StorageError::Encode {
            reason: format!("snapshot encryption failed: {e}"),
        })?;

    let mut out = Vec::with_capacity(MAGIC.len() + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts and rebuilds a graph.
///
/// Fails with [`StorageError::Decode`] on truncated or foreign bytes,
/// [`StorageError::Authentication`] on a wrong key or tampering, and
/// [`StorageError::Serialization`] if the authenticated plaintext is not a
/// snapshot.
pub fn deserialize(bytes: &[u8], key: &SymmetricKey) -> Result<NodeGraph, StorageError> {
    let header_len = MAGIC.len() + NONCE_LEN;
    if bytes.len() < header_len + TAG_LEN {
        return Err(StorageError::Decode {
            reason: format!("snapshot too short ({} bytes)", bytes.len()),
        });
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(StorageError::Decode {
            reason: "missing snapshot header".to_string(),
        });
    }

    let nonce = Nonce::from_slice(&bytes[MAGIC.len()..header_len]);
    let plaintext = cipher(key)
        .decrypt(
            nonce,
            Payload {
                msg: &bytes[header_len..],
                aad: MAGIC,
            },
        )
        .map_err(|_| StorageError::Authentication)?;

    let snapshot: Snapshot = serde_json::from_slice(&plaintext)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StorageError::Decode {
            reason: format!("unsupported snapshot version {}", snapshot.version),
        });
    }
    NodeGraph::from_nodes(snapshot.nodes).map_err(|e| StorageError::Decode {
        reason: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Per-node content sealing
// ---------------------------------------------------------------------------

/// Encrypts a node's content in place and sets `encrypted`.
///
/// The sealed form is a hex string of `nonce || ciphertext`, bound to the
/// node id through the associated data. Sealing uses a random nonce, so it
/// is not deterministic; whole-graph encryption still is.
pub fn seal_content(node: &mut Node, key: &SymmetricKey) -> Result<(), StorageError> {
    if node.encrypted {
        return Err(content_state(node, "content is already sealed"));
    }
    let plaintext = serde_json::to_vec(&node.content)?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher(key)
        .encrypt(
            &nonce,
            Payload {
                msg: &plaintext,
                aad: node.id.as_str().as_bytes(),
            },
        )
        .map_err(|e| content_state(node, &format!("sealing failed: {e}")))?;

    let mut sealed = nonce.to_vec();
    sealed.extend_from_slice(&ciphertext);
    node.content = Value::String(hex::encode(sealed));
    node.encrypted = true;
    Ok(())
}

/// Decrypts sealed node content in place and clears `encrypted`.
///
/// On any failure the node is left unchanged.
pub fn open_content(node: &mut Node, key: &SymmetricKey) -> Result<(), StorageError> {
    if !node.encrypted {
        return Err(content_state(node, "content is not sealed"));
    }
    let sealed = node
        .content
        .as_str()
        .and_then(|s| hex::decode(s).ok())
        .filter(|raw| raw.len() >= NONCE_LEN + TAG_LEN)
        .ok_or_else(|| content_state(node, "sealed content is malformed"))?;

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let plaintext = cipher(key)
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: node.id.as_str().as_bytes(),
            },
        )
        .map_err(|_| StorageError::Authentication)?;

    node.content = serde_json::from_slice(&plaintext)?;
    node.encrypted = false;
    Ok(())
}

fn content_state(node: &Node, reason: &str) -> StorageError {
    StorageError::ContentState {
        node: node.id.to_string(),
        reason: reason.to_string(),
    }
}
