//! Append-only, hash-chained audit journal.
//!
//! Every successful mutation appends a [`LedgerRecord`] whose SHA-256
//! payload hash commits to the event fields, the sequence number, and the
//! previous record's hash. [`AuditJournal::verify_chain`] replays the
//! links. The journal is observational only — accounting never reads it.

use chrono::Utc;
use opensynth_types::{LedgerEvent, LedgerRecord};
use sha2::{Digest, Sha256};

/// Hash of the empty chain head.
const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// Append-only audit trail for one engine instance.
#[derive(Debug)]
pub struct AuditJournal {
    records: Vec<LedgerRecord>,
}

impl AuditJournal {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append an event, chaining it to the latest record.
    pub fn append(&mut self, event: LedgerEvent) -> &LedgerRecord {
        let sequence = self.records.len() as u64;
        let prev_hash = self
            .records
            .last()
            .map_or(GENESIS_HASH, |r| r.payload_hash);
        let payload_hash = Self::compute_hash(sequence, &prev_hash, &event);

        tracing::debug!(sequence, event = %event, hash = %hex::encode(&payload_hash[..8]), "journal append");

        self.records.push(LedgerRecord {
            sequence,
            event,
            payload_hash,
            prev_hash,
            recorded_at: Utc::now(),
        });
        self.records.last().expect("record just pushed")
    }

    /// Verify sequence numbering, hash links, and every payload hash.
    #[must_use]
    pub fn verify_chain(&self) -> bool {
        let mut prev = GENESIS_HASH;
        for (i, record) in self.records.iter().enumerate() {
            if record.sequence != i as u64 || record.prev_hash != prev {
                return false;
            }
            let expected = Self::compute_hash(record.sequence, &record.prev_hash, &record.event);
            if record.payload_hash != expected {
                return false;
            }
            prev = record.payload_hash;
        }
        true
    }

    /// All records, oldest first.
    #[must_use]
    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compute the SHA-256 hash over one record's commitment:
    /// domain prefix, sequence, previous hash, event tag, event fields.
    fn compute_hash(sequence: u64, prev_hash: &[u8; 32], event: &LedgerEvent) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"opensynth:ledger:v1:");
        hasher.update(sequence.to_le_bytes());
        hasher.update(prev_hash);
        hasher.update(event.tag().as_bytes());

        match event {
            LedgerEvent::CollateralDeposited {
                user,
                currency,
                amount,
                value,
            }
            | LedgerEvent::CollateralWithdrawn {
                user,
                currency,
                amount,
                value,
            } => {
                hasher.update(user.0.as_bytes());
                hasher.update(currency.as_str().as_bytes());
                hasher.update(amount.to_string().as_bytes());
                hasher.update(value.to_string().as_bytes());
            }
            LedgerEvent::SynthsIssued {
                user,
                synth,
                amount,
                shares,
            }
            | LedgerEvent::SynthsBurned {
                user,
                synth,
                amount,
                shares,
            } => {
                hasher.update(user.0.as_bytes());
                hasher.update(synth.as_str().as_bytes());
                hasher.update(amount.to_string().as_bytes());
                hasher.update(shares.to_string().as_bytes());
            }
            LedgerEvent::CurrencyRegistered { currency } => {
                hasher.update(currency.as_str().as_bytes());
            }
            LedgerEvent::CurrencyEnabledSet { currency, enabled } => {
                hasher.update(currency.as_str().as_bytes());
                hasher.update([u8::from(*enabled)]);
            }
            LedgerEvent::SynthAdded { synth } => {
                hasher.update(synth.as_str().as_bytes());
            }
            LedgerEvent::SupplyCapSet { synth, cap } => {
                hasher.update(synth.as_str().as_bytes());
                hasher.update(cap.to_string().as_bytes());
            }
            LedgerEvent::IssuanceRatioSet { ratio } => {
                hasher.update(ratio.to_string().as_bytes());
            }
        }

        hasher.finalize().into()
    }
}

impl Default for AuditJournal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use opensynth_types::{CurrencyKey, UserId};
    use rust_decimal::Decimal;

    use super::*;

    fn deposit_event(user: UserId) -> LedgerEvent {
        LedgerEvent::CollateralDeposited {
            user,
            currency: CurrencyKey::new("ETH"),
            amount: Decimal::new(10, 0),
            value: Decimal::new(20_000, 0),
        }
    }

    #[test]
    fn empty_journal_verifies() {
        let journal = AuditJournal::new();
        assert!(journal.is_empty());
        assert!(journal.verify_chain());
    }

    #[test]
    fn append_chains_records() {
        let mut journal = AuditJournal::new();
        let user = UserId::new();
        journal.append(deposit_event(user));
        journal.append(LedgerEvent::SynthsIssued {
            user,
            synth: CurrencyKey::new("syUSD"),
            amount: Decimal::new(5000, 0),
            shares: Decimal::new(5000, 0),
        });

        assert_eq!(journal.len(), 2);
        assert_eq!(journal.records()[0].sequence, 0);
        assert_eq!(journal.records()[0].prev_hash, GENESIS_HASH);
        assert_eq!(
            journal.records()[1].prev_hash,
            journal.records()[0].payload_hash
        );
        assert!(journal.verify_chain());
    }

    #[test]
    fn tampered_event_detected() {
        let mut journal = AuditJournal::new();
        journal.append(deposit_event(UserId::new()));
        journal.append(deposit_event(UserId::new()));

        if let LedgerEvent::CollateralDeposited { amount, .. } = &mut journal.records[0].event {
            *amount = Decimal::new(999, 0);
        }
        assert!(!journal.verify_chain());
    }

    #[test]
    fn tampered_link_detected() {
        let mut journal = AuditJournal::new();
        journal.append(deposit_event(UserId::new()));
        journal.append(deposit_event(UserId::new()));

        journal.records[1].prev_hash = [7u8; 32];
        assert!(!journal.verify_chain());
    }

    #[test]
    fn identical_events_hash_differently_by_sequence() {
        let mut journal = AuditJournal::new();
        let user = UserId::new();
        journal.append(deposit_event(user));
        journal.append(deposit_event(user));
        assert_ne!(
            journal.records()[0].payload_hash,
            journal.records()[1].payload_hash
        );
    }
}
