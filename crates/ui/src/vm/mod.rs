mod practice_vm;

pub use practice_vm::{
    ActiveCardVm, CompletionVm, PracticeScreen, RoundSummaryVm, StageVm, StartScreenVm, StatsVm,
    encouragement_for, map_active_card, map_completion, map_round_summary, map_start_screen,
};
