// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zbus` client of `org.freedesktop.PolicyKit1`'s `Authority` interface —
//! the policy gate is, like the daemon's own bus surface, just another
//! `zbus` proxy, pointed at a different well-known name.

use crate::gate::{PolicyAction, PolicyDecision, PolicyDetails, PolicyError, PolicyGate};
use async_trait::async_trait;
use std::collections::HashMap;
use zbus::zvariant::Value;
use zbus::{proxy, Connection};

type Subject<'a> = (&'a str, HashMap<&'a str, Value<'a>>);
type AuthorizationResult = (bool, bool, HashMap<String, String>);

#[proxy(
    interface = "org.freedesktop.PolicyKit1.Authority",
    default_service = "org.freedesktop.PolicyKit1",
    default_path = "/org/freedesktop/PolicyKit1/Authority"
)]
trait Authority {
    #[zbus(name = "CheckAuthorization")]
    fn check_authorization(
        &self,
        subject: Subject<'_>,
        action_id: &str,
        details: HashMap<&str, &str>,
        flags: u32,
        cancellation_id: &str,
    ) -> zbus::Result<AuthorizationResult>;
}

const ALLOW_USER_INTERACTION: u32 = 1;

/// Authorizes RMI callers against `polkitd` over the system bus, treating
/// the caller's unique bus name as the subject (`subject-kind` =
/// `system-bus-name`).
pub struct PolkitGate {
    connection: Connection,
}

impl PolkitGate {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl PolicyGate for PolkitGate {
    async fn check(
        &self,
        action: PolicyAction,
        subject_bus_name: &str,
        details: &PolicyDetails,
    ) -> Result<PolicyDecision, PolicyError> {
        let proxy = AuthorityProxy::new(&self.connection).await?;

        let mut subject_details = HashMap::new();
        subject_details.insert("name", Value::from(subject_bus_name));
        let subject: Subject<'_> = ("system-bus-name", subject_details);

        let owned_details = details.to_map();
        let details_ref: HashMap<&str, &str> = owned_details.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let (is_authorized, is_challenge, _details) = proxy
            .check_authorization(subject, action.action_id(), details_ref, ALLOW_USER_INTERACTION, "")
            .await?;

        Ok(if is_authorized {
            PolicyDecision::Allow
        } else if is_challenge {
            PolicyDecision::Interactive
        } else {
            PolicyDecision::Deny
        })
    }
}
