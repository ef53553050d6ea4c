// Edition build pipeline: ordered activation passes over a rendered score.
//
// Sections are rendered once, with every edition's material present and
// tagged. Building an edition then means running a fixed sequence of passes
// over the text, each flipping the regions one concern is responsible for:
//
// 1. Edition filtering. Deactivate regions tagged against me or for another
//    audience, then activate regions tagged for me or only against others.
//    The order matters: a region tagged both ways ends up on, not off.
// 2. Fermata bar lines. Activate all bar-line extent adjustments on fermata
//    measures, then deactivate those not at the end of a line.
// 3. Shifted clefs. Activate all, then deactivate those at the start of a
//    line.
// 4. Middle of line. Activate `NOT_MOL` / `ONLY_MOL`, then deactivate the
//    ones on the wrong side of a line break.
// 5. Broken spanners. Show the "show to join" material, hide the "hide to
//    join" material.
// 6. Persistent indicator colors (optional, on or off per config).
// 7. Redundant indicators (optional, suppressed per config).
//
// Passes are not assumed to commute; `run` applies them strictly in list
// order and records every activation/deactivation step, including no-ops.

use crate::activation::{self, Activation, Direction};
use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::predicates;
use crate::tag::Tag;
use log::info;

/// One concern handled by the build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    EditionFiltering,
    FermataBarLines,
    ShiftedClefs,
    MiddleOfLine,
    BrokenSpannerJoin,
    PersistentIndicatorColors,
    RedundantIndicators,
}

impl Pass {
    /// The five passes every edition build runs, in order.
    pub const STANDARD: [Pass; 5] = [
        Pass::EditionFiltering,
        Pass::FermataBarLines,
        Pass::ShiftedClefs,
        Pass::MiddleOfLine,
        Pass::BrokenSpannerJoin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Pass::EditionFiltering => "edition filtering",
            Pass::FermataBarLines => "fermata bar lines",
            Pass::ShiftedClefs => "shifted clefs",
            Pass::MiddleOfLine => "middle of line",
            Pass::BrokenSpannerJoin => "broken spanner join",
            Pass::PersistentIndicatorColors => "persistent indicator colors",
            Pass::RedundantIndicators => "redundant indicators",
        }
    }
}

/// One activation or deactivation call made by a pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub pass: Pass,
    /// What the step selected, as printed in its message.
    pub label: String,
    pub direction: Direction,
    pub matched: usize,
    pub skipped: usize,
}

impl Step {
    pub fn message(&self) -> String {
        Activation {
            text: String::new(),
            matched: self.matched,
            skipped: self.skipped,
        }
        .message(&self.label, self.direction)
    }
}

/// Result of running a pipeline.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    pub text: String,
    pub steps: Vec<Step>,
}

impl PipelineRun {
    pub fn steps_for(&self, pass: Pass) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(move |s| s.pass == pass)
    }
}

/// Accumulates text and steps while passes run.
struct Runner {
    text: String,
    steps: Vec<Step>,
}

impl Runner {
    fn apply<P>(
        &mut self,
        pass: Pass,
        label: &str,
        direction: Direction,
        predicate: P,
    ) -> Result<(), BuildError>
    where
        P: Fn(&Tag) -> bool,
    {
        let result = match direction {
            Direction::Activate => activation::activate(&self.text, predicate)?,
            Direction::Deactivate => activation::deactivate(&self.text, predicate)?,
        };
        let step = Step {
            pass,
            label: label.to_string(),
            direction,
            matched: result.matched,
            skipped: result.skipped,
        };
        info!("{}: {}", pass.name(), step.message());
        self.text = result.text;
        self.steps.push(step);
        Ok(())
    }
}

/// An ordered list of passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pipeline {
    passes: Vec<Pass>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::standard()
    }
}

impl Pipeline {
    pub fn standard() -> Self {
        Self {
            passes: Pass::STANDARD.to_vec(),
        }
    }

    /// The standard passes plus the optional ones. Coloring always runs
    /// (it turns colors either on or off); redundant suppression only when
    /// asked for.
    pub fn from_config(config: &BuildConfig) -> Self {
        let mut passes = Pass::STANDARD.to_vec();
        passes.push(Pass::PersistentIndicatorColors);
        if config.suppress_redundant {
            passes.push(Pass::RedundantIndicators);
        }
        Self { passes }
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn run(&self, text: &str, config: &BuildConfig) -> Result<PipelineRun, BuildError> {
        let mut runner = Runner {
            text: text.to_string(),
            steps: Vec::new(),
        };
        for &pass in &self.passes {
            run_pass(&mut runner, pass, config)?;
        }
        Ok(PipelineRun {
            text: runner.text,
            steps: runner.steps,
        })
    }
}

fn run_pass(runner: &mut Runner, pass: Pass, config: &BuildConfig) -> Result<(), BuildError> {
    use Direction::{Activate, Deactivate};
    let breaks = &config.line_breaks;
    let target = &config.edition;
    match pass {
        Pass::EditionFiltering => {
            runner.apply(
                pass,
                "other-edition",
                Deactivate,
                predicates::excluded_from(target),
            )?;
            runner.apply(pass, "this-edition", Activate, predicates::included_in(target))?;
        }
        Pass::FermataBarLines => {
            runner.apply(
                pass,
                "fermata bar-line",
                Activate,
                predicates::is_fermata_bar_line,
            )?;
            runner.apply(
                pass,
                "non-EOL fermata bar-line",
                Deactivate,
                predicates::fermata_bar_line_off_line_end(breaks),
            )?;
        }
        Pass::ShiftedClefs => {
            runner.apply(pass, "shifted clef", Activate, predicates::is_shifted_clef)?;
            runner.apply(
                pass,
                "BOL shifted clef",
                Deactivate,
                predicates::shifted_clef_at_line_start(breaks),
            )?;
        }
        Pass::MiddleOfLine => {
            runner.apply(pass, "MOL", Activate, predicates::is_mol_sensitive)?;
            runner.apply(
                pass,
                "conflicting MOL",
                Deactivate,
                predicates::mol_misplaced(breaks),
            )?;
        }
        Pass::BrokenSpannerJoin => {
            runner.apply(pass, "show-to-join", Activate, predicates::is_show_to_join)?;
            runner.apply(pass, "hide-to-join", Deactivate, predicates::is_hide_to_join)?;
        }
        Pass::PersistentIndicatorColors => {
            if config.color_persistent_indicators {
                // Colors for material another edition owns stay off.
                let excluded = predicates::excluded_from(target);
                runner.apply(
                    pass,
                    "persistent indicator color",
                    Activate,
                    |tag: &Tag| predicates::is_persistent_indicator_color(tag) && !excluded(tag),
                )?;
            } else {
                runner.apply(
                    pass,
                    "persistent indicator color",
                    Deactivate,
                    predicates::is_persistent_indicator_color,
                )?;
            }
        }
        Pass::RedundantIndicators => {
            runner.apply(
                pass,
                "redundant indicator",
                Deactivate,
                predicates::is_redundant,
            )?;
        }
    }
    Ok(())
}

/// Untagged export: redundant indicators become visible again and every tag
/// comment is removed.
pub fn export_untagged(text: &str) -> Result<String, BuildError> {
    let visible = activation::activate(text, predicates::is_redundant)?;
    info!(
        "untagged export: {}",
        visible.message("redundant indicator", Direction::Activate)
    );
    activation::strip_tags(&visible.text)
}
