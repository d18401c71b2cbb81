use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::core::harmony::HarmonyFamily;
use crate::core::palette::resolve;
use crate::life::agent::{Agent, AgentSeed};
use crate::life::tier::PerformanceTier;
use crate::life::voice_pool::VoicePool;
use crate::render::RenderSurface;

/// Desired state handed to [`Population::reconcile`]. Values are expected to
/// be validated already; nothing is clamped here.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    pub density: usize,
    pub harmony: HarmonyFamily,
    pub range: u8,
    pub filter_frequency: f32,
    pub speed_factor: f32,
    pub sound_enabled: bool,
    pub tier: PerformanceTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileSummary {
    pub removed: usize,
    pub added: usize,
}

/// The live agent list. Insertion order is creation order and also decides
/// round-robin voice slots in the reduced tier.
pub struct Population {
    agents: Vec<Agent>,
    border_length: f32,
    tier: PerformanceTier,
    next_id: u64,
    rng: SmallRng,
}

impl Population {
    pub fn new(border_length: f32, tier: PerformanceTier) -> Self {
        Self::with_rng(border_length, tier, SmallRng::from_os_rng())
    }

    pub fn with_rng(border_length: f32, tier: PerformanceTier, rng: SmallRng) -> Self {
        Self {
            agents: Vec::new(),
            border_length,
            tier,
            next_id: 0,
            rng,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn border_length(&self) -> f32 {
        self.border_length
    }

    pub fn tier(&self) -> PerformanceTier {
        self.tier
    }

    pub fn frame_rate(&self) -> u32 {
        self.tier.frame_rate()
    }

    /// Bring the live list in line with `cfg` in one synchronous pass:
    /// truncate, update survivors in place, then append new agents.
    pub fn reconcile(&mut self, cfg: &ReconcileConfig) -> ReconcileSummary {
        let mut summary = ReconcileSummary::default();
        if self.agents.len() > cfg.density {
            summary.removed = self.agents.len() - cfg.density;
            self.agents.truncate(cfg.density);
        }

        self.tier = cfg.tier;
        let frame_rate = cfg.tier.frame_rate();
        let palette = resolve(cfg.harmony, cfg.range, cfg.filter_frequency);

        for (index, agent) in self.agents.iter_mut().enumerate() {
            agent.set_sound_enabled(cfg.sound_enabled);
            agent.set_voice(VoicePool::handle_for(cfg.tier, index));
            agent.set_new_note_and_color_properties(&palette, &mut self.rng);
            agent.set_speed_and_frame_rate(cfg.speed_factor, frame_rate, &mut self.rng);
        }

        while self.agents.len() < cfg.density {
            let index = self.agents.len();
            let seed = AgentSeed {
                id: self.next_id,
                border_length: self.border_length,
                frame_rate,
                speed_factor: cfg.speed_factor,
                palette: &palette,
                sound_enabled: cfg.sound_enabled,
                voice: VoicePool::handle_for(cfg.tier, index),
            };
            self.agents.push(Agent::spawn(seed, &mut self.rng));
            self.next_id += 1;
            summary.added += 1;
        }

        debug!(
            live = self.agents.len(),
            removed = summary.removed,
            added = summary.added,
            harmony = cfg.harmony.label(),
            notes = palette.possible_notes.len(),
            tier = ?cfg.tier,
            "population reconciled"
        );
        summary
    }

    /// One tick for every agent, in list order. Returns the border events
    /// produced this tick.
    pub fn advance_all(&mut self, surface: &mut dyn RenderSurface, voices: &mut VoicePool) -> usize {
        let mut events = 0;
        for agent in self.agents.iter_mut() {
            events += agent.advance(surface, voices, &mut self.rng);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(density: usize) -> ReconcileConfig {
        ReconcileConfig {
            density,
            harmony: HarmonyFamily::MajorPentatonic,
            range: 0,
            filter_frequency: 750.0,
            speed_factor: 1.0,
            sound_enabled: false,
            tier: PerformanceTier::Reduced,
        }
    }

    fn population() -> Population {
        Population::with_rng(500.0, PerformanceTier::Reduced, SmallRng::seed_from_u64(1))
    }

    #[test]
    fn ids_keep_counting_after_truncation() {
        let mut pop = population();
        pop.reconcile(&cfg(3));
        pop.reconcile(&cfg(1));
        pop.reconcile(&cfg(2));
        let ids: Vec<u64> = pop.agents().iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn tier_switch_moves_frame_rate_and_voices() {
        let mut pop = population();
        pop.reconcile(&cfg(4));
        let mut high = cfg(4);
        high.tier = PerformanceTier::HighFidelity;
        pop.reconcile(&high);
        assert_eq!(pop.frame_rate(), 60);
        assert!(pop.agents().iter().all(|a| a.frame_rate() == 60));
        assert!(
            pop.agents()
                .iter()
                .all(|a| a.voice() == VoicePool::handle_for(PerformanceTier::HighFidelity, 0))
        );
    }

    #[test]
    fn zero_density_empties() {
        let mut pop = population();
        pop.reconcile(&cfg(5));
        let summary = pop.reconcile(&cfg(0));
        assert_eq!(summary, ReconcileSummary { removed: 5, added: 0 });
        assert!(pop.is_empty());
    }
}
