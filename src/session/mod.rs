//! Login session
//!
//! A `Session` is the full set of decrypted datasets. It is only ever built
//! whole: the five resources are fetched and decrypted concurrently, and the
//! session exists only if every one of them succeeded. A new login replaces
//! the session; nothing mutates it in place.

mod selection;
mod stats;

pub use selection::{Selection, SelectionStore, DEFAULT_SELECTION_KEY};
pub use stats::{Occurrence, SummaryOverview, DEFAULT_ACTIVE_CHARS, TOP_COHESIVE_CHARS};

use crate::crypto::Decryptor;
use crate::dataset::{
    build_network_graph, parse_records, tokenize_transcript, CharFrequencyRecord, CohesionRecord,
    NetworkGraph, SummaryRecord, TextLine,
};
use crate::error::Result;
use crate::loader::{fetch_and_decrypt_json, fetch_and_decrypt_text};
use crate::store::{ByteStore, Resource};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decrypted, assembled datasets for one login
#[derive(Debug, Clone)]
pub struct Session {
    char_freq: Vec<CharFrequencyRecord>,
    char_cohesion: Vec<CohesionRecord>,
    char_summary: Vec<SummaryRecord>,
    network: NetworkGraph,
    transcript: Vec<TextLine>,
}

impl Session {
    /// Fetch and decrypt every resource, then assemble the datasets.
    ///
    /// All five fetches run to completion before any result is looked at.
    /// The first failure in resource order is returned and no session is
    /// produced.
    pub async fn login<S: ByteStore>(
        store: &S,
        decryptor: &Decryptor,
        password: &str,
    ) -> Result<Session> {
        info!("Decrypting {} resources", Resource::ALL.len());

        let freq_locator = Resource::CharFreq.locator();
        let cohesion_locator = Resource::CharCohesion.locator();
        let summary_locator = Resource::CharSummary.locator();
        let network_locator = Resource::CharNetwork.locator();
        let text_locator = Resource::RawText.locator();

        let (freq, cohesion, summary, network, raw_text) = futures::join!(
            fetch_and_decrypt_json(store, decryptor, &freq_locator, password),
            fetch_and_decrypt_json(store, decryptor, &cohesion_locator, password),
            fetch_and_decrypt_json(store, decryptor, &summary_locator, password),
            fetch_and_decrypt_json(store, decryptor, &network_locator, password),
            fetch_and_decrypt_text(store, decryptor, &text_locator, password),
        );

        for (resource, err) in [
            (Resource::CharFreq, freq.as_ref().err()),
            (Resource::CharCohesion, cohesion.as_ref().err()),
            (Resource::CharSummary, summary.as_ref().err()),
            (Resource::CharNetwork, network.as_ref().err()),
            (Resource::RawText, raw_text.as_ref().err()),
        ] {
            if let Some(e) = err {
                debug!("Loading {} failed ({}): {}", resource, e.kind(), e);
            }
        }

        let session = Session::assemble(freq?, cohesion?, summary?, Some(network?), &raw_text?)?;
        info!(
            "Session ready: {} chars, {} cohesion records, {} transcript lines",
            session.char_freq.len(),
            session.char_cohesion.len(),
            session.transcript.len()
        );
        Ok(session)
    }

    /// Build a session from already decrypted payloads
    pub fn assemble(
        char_freq: Value,
        char_cohesion: Value,
        char_summary: Value,
        network: Option<Value>,
        raw_text: &str,
    ) -> Result<Session> {
        let session = Session {
            char_freq: parse_records(&char_freq)?,
            char_cohesion: parse_records(&char_cohesion)?,
            char_summary: parse_records(&char_summary)?,
            network: build_network_graph(network.as_ref()),
            transcript: tokenize_transcript(raw_text),
        };

        session.report_inconsistencies();
        Ok(session)
    }

    fn report_inconsistencies(&self) {
        let bad_totals = self
            .char_summary
            .iter()
            .filter(|r| !r.is_consistent())
            .count();
        if bad_totals > 0 {
            warn!(
                "{} summary records have total_cohesion != left + right",
                bad_totals
            );
        }

        let dangling = self.network.dangling_links().len();
        if dangling > 0 {
            warn!("{} network links reference unknown nodes", dangling);
        }
    }

    /// Frequency table, in display rank order
    pub fn char_freq(&self) -> &[CharFrequencyRecord] {
        &self.char_freq
    }

    pub fn char_cohesion(&self) -> &[CohesionRecord] {
        &self.char_cohesion
    }

    pub fn char_summary(&self) -> &[SummaryRecord] {
        &self.char_summary
    }

    pub fn network(&self) -> &NetworkGraph {
        &self.network
    }

    pub fn transcript(&self) -> &[TextLine] {
        &self.transcript
    }
}

/// Holder for the current session, owned by the application shell.
///
/// The session is swapped as a whole, so readers see either the previous
/// datasets or the new ones, never a mix.
#[derive(Debug, Default)]
pub struct SessionSlot {
    current: RwLock<Option<Arc<Session>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, if logged in
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.read().is_some()
    }

    /// Install a new session, returning the previous one
    pub fn replace(&self, session: Session) -> Option<Arc<Session>> {
        self.current.write().replace(Arc::new(session))
    }

    /// Drop the current session
    pub fn clear(&self) -> Option<Arc<Session>> {
        self.current.write().take()
    }

    /// Log in and install the session on success. On failure the slot keeps
    /// whatever it held before.
    pub async fn login<S: ByteStore>(
        &self,
        store: &S,
        decryptor: &Decryptor,
        password: &str,
    ) -> Result<Arc<Session>> {
        let session = Arc::new(Session::login(store, decryptor, password).await?);
        *self.current.write() = Some(Arc::clone(&session));
        Ok(session)
    }
}
