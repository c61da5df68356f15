//! Integration test common infrastructure.
//!
//! Wires an [`Engine`] to an in-process membership table, a canned WHOIS
//! resolver and an outbound collector, with the bot already in `#coop`.

pub mod resolver;

#[allow(unused_imports)]
pub use resolver::StaticResolver;

use slirc_motions::casemap::CaseMapper;
use slirc_motions::db::{MotionStore, NoOpStore};
use slirc_motions::hostmask::Hostmask;
use slirc_motions::state::MemberTable;
use slirc_motions::{Config, Engine, EngineParams, JoinOutcome, Outbound};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub const CHANNEL: &str = "#coop";
pub const BOT: &str = "motionbot";

pub struct Harness {
    pub engine: Engine,
    pub members: Arc<MemberTable>,
    pub resolver: Arc<StaticResolver>,
    outbound: UnboundedReceiver<Outbound>,
}

#[allow(dead_code)]
impl Harness {
    /// Engine with no store, joined to `#coop`, with `chair` opped.
    pub async fn new() -> Self {
        Self::with_store(Config::default(), Arc::new(NoOpStore)).await
    }

    pub async fn with_store(config: Config, store: Arc<dyn MotionStore>) -> Self {
        let mapper = Arc::new(CaseMapper::new(config.server.casemapping));
        let members = Arc::new(MemberTable::new(Arc::clone(&mapper)));
        let resolver = Arc::new(StaticResolver::default());

        let (engine, outbound) = Engine::new(EngineParams {
            config: &config,
            mapper,
            membership: members.clone(),
            resolver: resolver.clone(),
            store,
        });

        let mut harness = Self {
            engine,
            members,
            resolver,
            outbound,
        };
        harness.bot_joins(CHANNEL).await;
        harness.member("chair", "@");
        harness.drain();
        harness
    }

    /// The bot joins `channel` (and sees itself opped).
    pub async fn bot_joins(&mut self, channel: &str) {
        let me = Hostmask::new(BOT, "bot", "bot.example.org");
        let outcome = self.engine.on_join(&me, channel).await.unwrap();
        assert_eq!(outcome, JoinOutcome::Tracked);
        self.members.add_member(channel, BOT, "@");
    }

    /// Put `nick` in `#coop` with the given prefixes, bypassing the engine.
    pub fn member(&self, nick: &str, prefixes: &str) {
        self.members.add_member(CHANNEL, nick, prefixes);
    }

    /// Route a full join of `nick!user@host` into `#coop`.
    pub async fn join(&self, nick: &str, user: &str, host: &str) -> JoinOutcome {
        self.members.add_member(CHANNEL, nick, "");
        self.engine
            .on_join(&Hostmask::new(nick, user, host), CHANNEL)
            .await
            .unwrap()
    }

    /// Open a meeting and a motion as `chair`.
    pub async fn open_motion(&mut self, quorum: u64) {
        self.engine
            .set_quorum("chair", CHANNEL, &quorum.to_string())
            .await
            .unwrap();
        self.engine.start_meeting("chair", CHANNEL).await.unwrap();
        self.engine
            .set_motion_text("chair", CHANNEL, "Buy a new kettle")
            .await
            .unwrap();
        self.engine.start_motion("chair", CHANNEL).await.unwrap();
        self.drain();
    }

    /// Everything emitted since the last drain.
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut out = Vec::new();
        while let Ok(item) = self.outbound.try_recv() {
            out.push(item);
        }
        out
    }

    /// Channel notice texts emitted since the last drain; other output is
    /// discarded.
    pub fn notices(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|out| match out {
                Outbound::ChannelNotice { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}
