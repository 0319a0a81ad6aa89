//! Prompt queue entries.
//!
//! A prompt asks one player for one decision. Prompts are queued FIFO on
//! the game state; an action answers the first prompt addressed to its
//! player and must match that prompt's kind.
//!
//! ## Validation
//!
//! `Prompt::check` rejects any answer the prompt did not offer: unknown or
//! disabled choices, selections of the wrong size, duplicates, cards or
//! fields that were not listed. Handlers still re-check game conditions
//! (coins, grapes, capacity) because those are what the answer acts on.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::cards::{requirements_met, CardId, Coupon, VineId, VisitorId, WineRequirement};
use crate::core::{Action, ActionError, FieldId, GrapeSpec, PlayerId, Season};
use crate::visitors::VisitorChoice;

/// Identifier of a `ChooseAction` option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceId {
    PapaCoins,
    PapaStructure,
    /// Row on the wake-up chart, 0..7.
    WakeUp(u8),
    WakeUpDrawSummer,
    WakeUpDrawWinter,
    FallDrawSummer,
    FallDrawWinter,
    SellGrapes,
    BuyField,
    SellField,
    YokeHarvest,
    YokeUproot,
    Grape(GrapeSpec),
    Visitor(VisitorChoice),
}

/// One option of a choice prompt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub label: String,
    /// Shown instead of allowing the choice.
    pub disabled_reason: Option<String>,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            disabled_reason: None,
        }
    }

    /// Disable this choice when `reason` is set.
    #[must_use]
    pub fn disabled_if(mut self, reason: Option<String>) -> Self {
        self.disabled_reason = reason;
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.disabled_reason.is_none()
    }
}

/// What a prompt is asking for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromptKind {
    ChooseAction {
        title: String,
        choices: Vec<Choice>,
        visitor: Option<VisitorId>,
    },
    ChooseActionMulti {
        title: String,
        choices: Vec<Choice>,
        min: usize,
        max: usize,
        visitor: Option<VisitorId>,
    },
    ChooseCards {
        title: String,
        cards: Vec<CardId>,
        min: usize,
        max: usize,
    },
    ChooseField {
        title: String,
        fields: Vec<FieldId>,
        min: usize,
        max: usize,
    },
    ChooseVine {
        title: String,
        vines: Vec<VineId>,
        optional: bool,
    },
    ChooseWine {
        title: String,
        requirements: Vec<WineRequirement>,
    },
    MakeWine {
        up_to: usize,
    },
    BuildStructure {
        coupon: Option<Coupon>,
        optional: bool,
    },
    PlaceWorker {
        season: Season,
    },
}

impl PromptKind {
    /// Wire name of the action that answers this prompt.
    #[must_use]
    pub fn answer_name(&self) -> &'static str {
        match self {
            PromptKind::ChooseAction { .. } => "CHOOSE_ACTION",
            PromptKind::ChooseActionMulti { .. } => "CHOOSE_ACTION_MULTI",
            PromptKind::ChooseCards { .. } => "CHOOSE_CARDS",
            PromptKind::ChooseField { .. } => "CHOOSE_FIELD",
            PromptKind::ChooseVine { .. } => "CHOOSE_VINE",
            PromptKind::ChooseWine { .. } => "CHOOSE_WINE",
            PromptKind::MakeWine { .. } => "MAKE_WINE",
            PromptKind::BuildStructure { .. } => "BUILD_STRUCTURE",
            PromptKind::PlaceWorker { .. } => "PLACE_WORKER",
        }
    }
}

/// A decision one player owes the game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub player_id: PlayerId,
    pub kind: PromptKind,
}

impl Prompt {
    #[must_use]
    pub fn new(player_id: PlayerId, kind: PromptKind) -> Self {
        Self { player_id, kind }
    }

    // === Constructors ===

    #[must_use]
    pub fn choose_action(
        player_id: PlayerId,
        title: impl Into<String>,
        choices: Vec<Choice>,
        visitor: Option<VisitorId>,
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseAction {
                title: title.into(),
                choices,
                visitor,
            },
        )
    }

    #[must_use]
    pub fn choose_multi(
        player_id: PlayerId,
        title: impl Into<String>,
        choices: Vec<Choice>,
        (min, max): (usize, usize),
        visitor: Option<VisitorId>,
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseActionMulti {
                title: title.into(),
                choices,
                min,
                max,
                visitor,
            },
        )
    }

    #[must_use]
    pub fn choose_cards(
        player_id: PlayerId,
        title: impl Into<String>,
        cards: Vec<CardId>,
        (min, max): (usize, usize),
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseCards {
                title: title.into(),
                cards,
                min,
                max,
            },
        )
    }

    #[must_use]
    pub fn choose_field(
        player_id: PlayerId,
        title: impl Into<String>,
        fields: Vec<FieldId>,
        (min, max): (usize, usize),
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseField {
                title: title.into(),
                fields,
                min,
                max,
            },
        )
    }

    #[must_use]
    pub fn choose_vine(
        player_id: PlayerId,
        title: impl Into<String>,
        vines: Vec<VineId>,
        optional: bool,
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseVine {
                title: title.into(),
                vines,
                optional,
            },
        )
    }

    #[must_use]
    pub fn choose_wine(
        player_id: PlayerId,
        title: impl Into<String>,
        requirements: Vec<WineRequirement>,
    ) -> Self {
        Self::new(
            player_id,
            PromptKind::ChooseWine {
                title: title.into(),
                requirements,
            },
        )
    }

    #[must_use]
    pub fn make_wine(player_id: PlayerId, up_to: usize) -> Self {
        Self::new(player_id, PromptKind::MakeWine { up_to })
    }

    #[must_use]
    pub fn build_structure(player_id: PlayerId, coupon: Option<Coupon>, optional: bool) -> Self {
        Self::new(player_id, PromptKind::BuildStructure { coupon, optional })
    }

    #[must_use]
    pub fn place_worker(player_id: PlayerId, season: Season) -> Self {
        Self::new(player_id, PromptKind::PlaceWorker { season })
    }

    // === Validation ===

    /// Check that `action` is an answer this prompt allows.
    pub fn check(&self, action: &Action) -> Result<(), ActionError> {
        match (&self.kind, action) {
            (PromptKind::ChooseAction { choices, .. }, Action::ChooseAction { choice, .. }) => {
                check_choice(choices, *choice)
            }
            (
                PromptKind::ChooseActionMulti { choices, min, max, .. },
                Action::ChooseActionMulti { choices: picked, .. },
            ) => {
                check_size(picked.len(), *min, *max)?;
                check_distinct(picked)?;
                picked.iter().try_for_each(|&c| check_choice(choices, c))
            }
            (PromptKind::ChooseCards { cards, min, max, .. }, Action::ChooseCards { .. }) => {
                let picked = action.selected_cards();
                check_size(picked.len(), *min, *max)?;
                check_distinct(picked)?;
                check_listed(cards, picked)
            }
            (PromptKind::ChooseField { fields, min, max, .. }, Action::ChooseField { fields: picked, .. }) => {
                check_size(picked.len(), *min, *max)?;
                check_distinct(picked)?;
                check_listed(fields, picked)
            }
            (PromptKind::ChooseVine { vines, optional, .. }, Action::ChooseVine { vine, .. }) => match vine {
                None if *optional => Ok(()),
                None => Err(ActionError::SelectionSize { count: 0, min: 1, max: 1 }),
                Some(v) => check_listed(vines, &[*v]),
            },
            (PromptKind::ChooseWine { requirements, .. }, Action::ChooseWine { wines, .. }) => {
                check_size(wines.len(), requirements.len(), requirements.len())?;
                check_distinct(wines)?;
                if requirements_met(requirements, wines) {
                    Ok(())
                } else {
                    Err(ActionError::Rejected(
                        "the selected wines do not meet the requirements".into(),
                    ))
                }
            }
            (PromptKind::MakeWine { up_to }, Action::MakeWine { ingredients, .. }) => {
                check_size(ingredients.len(), 0, *up_to)
            }
            (PromptKind::BuildStructure { optional, .. }, Action::BuildStructure { structure_id, .. }) => {
                match structure_id {
                    None if !*optional => Err(ActionError::SelectionSize { count: 0, min: 1, max: 1 }),
                    _ => Ok(()),
                }
            }
            (PromptKind::PlaceWorker { .. }, Action::PlaceWorker { .. } | Action::Pass { .. }) => Ok(()),
            (kind, action) => Err(ActionError::WrongPromptKind {
                player: self.player_id.clone(),
                expected: kind.answer_name(),
                received: action.kind_name(),
            }),
        }
    }
}

fn check_choice(choices: &[Choice], id: ChoiceId) -> Result<(), ActionError> {
    let choice = choices
        .iter()
        .find(|c| c.id == id)
        .ok_or(ActionError::ChoiceNotOffered(id))?;
    match &choice.disabled_reason {
        Some(reason) => Err(ActionError::ChoiceDisabled {
            choice: id,
            reason: reason.clone(),
        }),
        None => Ok(()),
    }
}

fn check_size(count: usize, min: usize, max: usize) -> Result<(), ActionError> {
    if count < min || count > max {
        return Err(ActionError::SelectionSize { count, min, max });
    }
    Ok(())
}

fn check_distinct<T: Hash + Eq>(items: &[T]) -> Result<(), ActionError> {
    let mut seen = FxHashSet::default();
    if items.iter().all(|item| seen.insert(item)) {
        Ok(())
    } else {
        Err(ActionError::DuplicateSelection)
    }
}

fn check_listed<T: PartialEq + std::fmt::Debug>(offered: &[T], picked: &[T]) -> Result<(), ActionError> {
    match picked.iter().find(|p| !offered.contains(p)) {
        Some(missing) => Err(ActionError::NotOffered(format!("{missing:?}"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::VineKind;
    use crate::core::{WineColor, WineSpec};

    fn viny() -> PlayerId {
        PlayerId::from("viny")
    }

    #[test]
    fn test_disabled_choice_rejected() {
        let prompt = Prompt::choose_action(
            viny(),
            "Pick",
            vec![
                Choice::new(ChoiceId::BuyField, "Buy"),
                Choice::new(ChoiceId::SellField, "Sell").disabled_if(Some("No empty field".into())),
            ],
            None,
        );

        let pick = |choice| Action::ChooseAction { player_id: viny(), choice };
        assert!(prompt.check(&pick(ChoiceId::BuyField)).is_ok());
        assert!(matches!(
            prompt.check(&pick(ChoiceId::SellField)),
            Err(ActionError::ChoiceDisabled { .. })
        ));
        assert_eq!(
            prompt.check(&pick(ChoiceId::SellGrapes)),
            Err(ActionError::ChoiceNotOffered(ChoiceId::SellGrapes))
        );
    }

    #[test]
    fn test_wrong_kind_rejected() {
        let prompt = Prompt::place_worker(viny(), Season::Summer);
        let action = Action::ChooseField { player_id: viny(), fields: vec![] };
        assert!(matches!(
            prompt.check(&action),
            Err(ActionError::WrongPromptKind { expected: "PLACE_WORKER", .. })
        ));
        assert!(prompt.check(&Action::Pass { player_id: viny() }).is_ok());
    }

    #[test]
    fn test_field_selection_bounds() {
        let prompt = Prompt::choose_field(viny(), "Harvest", vec![FieldId::new(0), FieldId::new(2)], (1, 2));
        let choose = |fields: Vec<FieldId>| Action::ChooseField { player_id: viny(), fields };

        assert!(prompt.check(&choose(vec![FieldId::new(2)])).is_ok());
        assert!(prompt.check(&choose(vec![])).is_err());
        assert!(prompt.check(&choose(vec![FieldId::new(1)])).is_err());
        assert_eq!(
            prompt.check(&choose(vec![FieldId::new(0), FieldId::new(0)])),
            Err(ActionError::DuplicateSelection)
        );
    }

    #[test]
    fn test_optional_vine_and_cards() {
        let vine = VineId::new(VineKind::Malvasia, 0);
        let optional = Prompt::choose_vine(viny(), "Plant", vec![vine], true);
        let required = Prompt::choose_vine(viny(), "Plant", vec![vine], false);
        let none = Action::ChooseVine { player_id: viny(), vine: None };

        assert!(optional.check(&none).is_ok());
        assert!(required.check(&none).is_err());

        let cards = Prompt::choose_cards(viny(), "Visitor", vec![CardId::Vine(vine)], (0, 1));
        assert!(cards.check(&Action::ChooseCards { player_id: viny(), cards: None }).is_ok());
    }

    #[test]
    fn test_wine_requirements() {
        let prompt = Prompt::choose_wine(viny(), "Fill", vec![WineRequirement::new(WineColor::Red, 3)]);
        let choose = |value| Action::ChooseWine {
            player_id: viny(),
            wines: vec![WineSpec::new(WineColor::Red, value)],
        };
        assert!(prompt.check(&choose(4)).is_ok());
        assert!(prompt.check(&choose(2)).is_err());
    }
}
