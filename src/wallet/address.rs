//! Pulls the wallet address out of a wallet-creation response

use serde_json::Value;

use crate::types::WalletResponse;

/// One place an address may live in the response, as a JSON pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRule {
    pub name: &'static str,
    pub pointer: &'static str,
}

impl AddressRule {
    /// Non-empty string at this rule's location, if any
    pub fn apply<'a>(&self, response: &'a Value) -> Option<&'a str> {
        response
            .pointer(self.pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Tried in order; first match wins
pub const ADDRESS_RULES: [AddressRule; 4] = [
    AddressRule {
        name: "publicKey",
        pointer: "/publicKey",
    },
    AddressRule {
        name: "wallet.publicKey",
        pointer: "/wallet/publicKey",
    },
    AddressRule {
        name: "address",
        pointer: "/address",
    },
    AddressRule {
        name: "accountAddress",
        pointer: "/accountAddress",
    },
];

pub fn extract_address(response: &WalletResponse) -> Option<String> {
    ADDRESS_RULES
        .iter()
        .find_map(|rule| rule.apply(response.as_value()))
        .map(str::to_string)
}
