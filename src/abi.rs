//! Entry signatures, dispatch selectors and the ABI description.
//!
//! The generated program exposes one function under two signatures that
//! differ only in the declared element type of the input array. Both accept
//! bit-identical calldata and share one implementation.

use serde::Serialize;
use tiny_keccak::{Hasher, Keccak};

use crate::field::Word;

/// Function name shared by both entry signatures.
pub const FUNCTION_NAME: &str = "poseidonExt";

/// Calldata offset of the initial capacity element.
pub const CAPACITY_OFFSET: u64 = 4;

/// Calldata offset of `input[index]`.
pub fn input_offset(index: usize) -> u64 {
    CAPACITY_OFFSET + 32 + 32 * index as u64
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntrySignature {
    /// `poseidonExt(uint256,uint256[n])`
    UintArray,
    /// `poseidonExt(uint256,bytes32[n])`
    Bytes32Array,
}

impl EntrySignature {
    pub const ALL: [EntrySignature; 2] = [EntrySignature::UintArray, EntrySignature::Bytes32Array];

    pub fn element_type(self) -> &'static str {
        match self {
            EntrySignature::UintArray => "uint256",
            EntrySignature::Bytes32Array => "bytes32",
        }
    }

    /// Canonical signature string for `arity` inputs.
    pub fn signature(self, arity: usize) -> String {
        format!("{}(uint256,{}[{}])", FUNCTION_NAME, self.element_type(), arity)
    }

    /// First four bytes of the Keccak-256 of the signature.
    pub fn selector(self, arity: usize) -> [u8; 4] {
        let digest = keccak256(self.signature(arity).as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Both dispatch codes accepted for `arity`, in dispatch order.
pub fn accepted_selectors(arity: usize) -> [[u8; 4]; 2] {
    EntrySignature::ALL.map(|entry| entry.selector(arity))
}

/// Encode a call: selector, capacity element, then each input word.
pub fn encode_call(selector: [u8; 4], capacity: &Word, inputs: &[Word]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * (inputs.len() + 1));
    data.extend_from_slice(&selector);
    data.extend_from_slice(capacity);
    for input in inputs {
        data.extend_from_slice(input);
    }
    data
}

// ─── ABI JSON ──────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiParam {
    pub internal_type: String,
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiFunction {
    pub constant: bool,
    pub inputs: Vec<AbiParam>,
    pub name: String,
    pub outputs: Vec<AbiParam>,
    pub payable: bool,
    pub state_mutability: String,
    #[serde(rename = "type")]
    pub ty: String,
}

fn param(ty: &str, name: &str) -> AbiParam {
    AbiParam {
        internal_type: ty.to_string(),
        name: name.to_string(),
        ty: ty.to_string(),
    }
}

/// ABI entries for both signatures, `bytes32` variant first.
pub fn abi(arity: usize) -> Vec<AbiFunction> {
    [EntrySignature::Bytes32Array, EntrySignature::UintArray]
        .into_iter()
        .map(|entry| {
            let element = entry.element_type();
            let array = format!("{}[{}]", element, arity);
            AbiFunction {
                constant: true,
                inputs: vec![param("uint256", "initialState"), param(&array, "input")],
                name: FUNCTION_NAME.to_string(),
                outputs: vec![param(element, "")],
                payable: false,
                state_mutability: "pure".to_string(),
                ty: "function".to_string(),
            }
        })
        .collect()
}

pub fn abi_json(arity: usize) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&abi(arity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        assert_eq!(
            EntrySignature::UintArray.signature(2),
            "poseidonExt(uint256,uint256[2])"
        );
        assert_eq!(
            EntrySignature::Bytes32Array.signature(8),
            "poseidonExt(uint256,bytes32[8])"
        );
    }

    #[test]
    fn test_keccak_known_selector() {
        // transfer(address,uint256)
        assert_eq!(&keccak256(b"transfer(address,uint256)")[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn test_selectors_distinct_per_arity_and_entry() {
        let mut seen = std::collections::HashSet::new();
        for arity in 1..=8 {
            for sel in accepted_selectors(arity) {
                assert!(seen.insert(sel), "selector collision at arity {}", arity);
            }
        }
    }

    #[test]
    fn test_encode_call_layout() {
        let cap = crate::field::word_from_u64(1);
        let inputs = [crate::field::word_from_u64(2), crate::field::word_from_u64(3)];
        let data = encode_call([0xaa, 0xbb, 0xcc, 0xdd], &cap, &inputs);
        assert_eq!(data.len(), 4 + 3 * 32);
        assert_eq!(&data[..4], &[0xaa, 0xbb, 0xcc, 0xdd]);
        assert_eq!(data[CAPACITY_OFFSET as usize + 31], 1);
        assert_eq!(data[input_offset(0) as usize + 31], 2);
        assert_eq!(data[input_offset(1) as usize + 31], 3);
    }

    #[test]
    fn test_abi_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&abi_json(3).unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["inputs"][1]["type"], "bytes32[3]");
        assert_eq!(entries[1]["inputs"][1]["internalType"], "uint256[3]");
        assert_eq!(entries[1]["outputs"][0]["type"], "uint256");
        assert_eq!(entries[0]["stateMutability"], "pure");
        assert_eq!(entries[0]["name"], "poseidonExt");
    }
}
