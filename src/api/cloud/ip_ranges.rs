//
//  bitbucket-provider
//  api/cloud/ip_ranges.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! The Atlassian IP range document, served unauthenticated by
//! `ip-ranges.atlassian.com`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpRanges {
    #[serde(default, rename = "syncToken")]
    pub sync_token: i64,

    #[serde(default, rename = "creationDate")]
    pub creation_date: Option<String>,

    #[serde(default)]
    pub items: Vec<IpRange>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IpRange {
    pub network: String,
    pub mask_len: i64,
    pub cidr: String,
    pub mask: String,
    pub region: Vec<String>,
    pub product: Vec<String>,
    pub direction: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_sync_token_and_items() {
        let doc: IpRanges = serde_json::from_str(
            r#"{
                "creationDate": "2024-01-01T00:00:00.000000",
                "syncToken": 1700000000,
                "items": [{
                    "network": "104.192.136.0",
                    "mask_len": 21,
                    "cidr": "104.192.136.0/21",
                    "mask": "255.255.248.0",
                    "region": ["us-east-1"],
                    "product": ["bitbucket"],
                    "direction": ["ingress", "egress"]
                }]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.sync_token, 1_700_000_000);
        assert_eq!(doc.items[0].direction.len(), 2);
    }
}
