//! Visitor card resolvers.
//!
//! Playing a visitor is a pending action of its own. The player first
//! picks a card from hand (`ChooseCards`), then the card's resolver takes
//! over: it queues prompts, receives their answers through `respond` and
//! finishes with `end_visitor`.
//!
//! ## Resolvers
//!
//! Each card is a unit struct implementing `VisitorEffect`, looked up with
//! a `match` in `visitor_effect`. Cards that need to remember something
//! between prompts keep it in `VisitorProgress`.
//!
//! ## Rosters
//!
//! Cards that ask several players (Banker, Handyman, Volunteer Crew,
//! Guest Speaker) prompt everyone at once and keep a roster of players who
//! have not answered. Each answer removes one name; the last one pays out
//! the owner's reward and ends the visitor.

mod summer;
mod winter;

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, Coupon, VineId, VisitorId};
use crate::core::{
    Action, ActionError, ActivityEvent, CurrentTurn, GameState, PendingAction, PlayerId, Season,
    WorkerPlacementTurn,
};
use crate::prompts::{Choice, ChoiceId, Prompt};
use crate::rules::board;
use crate::rules::mutators::Transaction;
use crate::rules::{selectors, turn};

pub use summer::*;
pub use winter::*;

/// A visitor placement in progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayVisitor {
    pub season: Season,
    /// The card being resolved. `None` while the player picks one.
    pub visitor: Option<VisitorId>,
    pub progress: VisitorProgress,
    /// Further visitors this placement allows after the current one.
    pub plays_left: u8,
}

/// Card-specific state kept between prompts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum VisitorProgress {
    #[default]
    Idle,
    /// Waiting for a structure to be picked.
    Building { coupon: Option<Coupon> },
    /// `vine` has left the hand and waits for a field.
    Planting { vine: Option<VineId>, left: u8 },
    /// First vine of a switch, once picked.
    Switching { first: Option<VineId> },
    /// Players who still have to answer.
    Roster { waiting: Vec<PlayerId>, accepted: u8 },
    /// Roster whose answer is a vine and then a field.
    VolunteerCrew {
        waiting: Vec<PlayerId>,
        accepted: u8,
        chosen: Vec<(PlayerId, VineId)>,
    },
    /// Steps left to resolve, in order.
    Contractor {
        steps: Vec<VisitorChoice>,
        vine: Option<VineId>,
    },
}

impl VisitorProgress {
    /// Vines taken out of a hand and not yet planted.
    #[must_use]
    pub fn limbo_vines(&self) -> Vec<VineId> {
        match self {
            VisitorProgress::Planting { vine, .. } | VisitorProgress::Contractor { vine, .. } => {
                vine.iter().copied().collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Options offered by visitor cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitorChoice {
    TourGain4,
    TourHarvest,
    BankerGain,
    BankerPass,
    BuyerPlaceRed,
    BuyerPlaceWhite,
    BuyerDiscard,
    LandscaperDrawPlant,
    LandscaperSwitch,
    PatronGain,
    PatronDraw,
    SponsorDraw,
    SponsorGain,
    SponsorBoth,
    ArchitectLoseOne,
    ArchitectLoseTwo,
    BrokerLoseVp,
    BrokerGainVp,
    ContractorVp,
    ContractorBuild,
    ContractorPlant,
    PlanterPlant,
    PlanterUproot,
    SurveyorEmpty,
    SurveyorPlanted,
    NegotiatorGrape,
    NegotiatorWine,
    JudgeDraw,
    JudgeDiscard,
    ProfessorTrain,
    ProfessorGain,
    TeacherMake,
    TeacherTrain,
    CrusherGain,
    CrusherDraw,
    NobleResidual,
    NobleVp,
    GuestTrain,
    GuestPass,
    AssessorGain,
    AssessorDiscard,
    QueenLoseVp,
    QueenGiveCards,
    QueenPay,
}

/// Behavior of one visitor card.
pub trait VisitorEffect: Sync {
    fn id(&self) -> VisitorId;

    /// Options offered when the card is played. Empty for cards that act
    /// at once.
    fn choices(&self, _state: &GameState, _player: &PlayerId) -> Vec<Choice> {
        Vec::new()
    }

    /// Why the card cannot be played now. By default a card whose options
    /// are all disabled is unplayable.
    fn unplayable_reason(&self, state: &GameState, player: &PlayerId) -> Option<String> {
        let choices = self.choices(state, player);
        (!choices.is_empty() && !choices.iter().any(Choice::is_enabled))
            .then(|| format!("{} has nothing to do", self.id()))
    }

    /// Start resolving the card. Offers `choices` by default.
    fn play(&self, tx: &mut Transaction, player: &PlayerId) -> Result<(), ActionError> {
        let choices = self.choices(tx, player);
        offer(tx, player, self.id(), choices);
        Ok(())
    }

    /// Handle an answer to one of the card's prompts.
    fn respond(&self, tx: &mut Transaction, action: &Action, progress: VisitorProgress) -> Result<(), ActionError>;
}

/// Resolver for a visitor card.
#[must_use]
pub fn visitor_effect(id: VisitorId) -> &'static dyn VisitorEffect {
    match id {
        VisitorId::TourGuide => &TourGuide,
        VisitorId::Banker => &Banker,
        VisitorId::Buyer => &Buyer,
        VisitorId::Landscaper => &Landscaper,
        VisitorId::Organizer => &Organizer,
        VisitorId::Patron => &Patron,
        VisitorId::Sponsor => &Sponsor,
        VisitorId::UncertifiedArchitect => &UncertifiedArchitect,
        VisitorId::UncertifiedBroker => &UncertifiedBroker,
        VisitorId::Contractor => &Contractor,
        VisitorId::Planter => &Planter,
        VisitorId::Handyman => &Handyman,
        VisitorId::VolunteerCrew => &VolunteerCrew,
        VisitorId::Surveyor => &Surveyor,
        VisitorId::Agriculturist => &Agriculturist,
        VisitorId::Negotiator => &Negotiator,
        VisitorId::Judge => &Judge,
        VisitorId::Politician => &Politician,
        VisitorId::Professor => &Professor,
        VisitorId::Taster => &Taster,
        VisitorId::Teacher => &Teacher,
        VisitorId::Crusher => &Crusher,
        VisitorId::Noble => &Noble,
        VisitorId::GuestSpeaker => &GuestSpeaker,
        VisitorId::Assessor => &Assessor,
        VisitorId::Queen => &Queen,
        VisitorId::Supervisor => &Supervisor,
    }
}

// === Dispatch ===

/// Resolve an answer given while a visitor placement is pending.
pub(crate) fn resolve(tx: &mut Transaction, action: &Action) -> Result<(), ActionError> {
    let play = play_mut(tx).clone();
    match play.visitor {
        None => choose_visitor(tx, action, &play),
        Some(visitor) => visitor_effect(visitor).respond(tx, action, play.progress),
    }
}

fn choose_visitor(tx: &mut Transaction, action: &Action, play: &PlayVisitor) -> Result<(), ActionError> {
    let player = actor(action)?;
    let visitor = match action.selected_cards() {
        [] => {
            turn::end_turn(tx);
            return Ok(());
        }
        [CardId::Visitor(v)] => *v,
        _ => return Err(unexpected(action)),
    };
    if visitor.season() != play.season {
        return Err(ActionError::NotOffered(visitor.to_string()));
    }
    let effect = visitor_effect(visitor);
    if let Some(reason) = effect.unplayable_reason(tx, &player) {
        return Err(ActionError::Rejected(reason));
    }

    tx.take_from_hand(&player, CardId::Visitor(visitor))?;
    tx.log(ActivityEvent::Visitor {
        player_id: player.clone(),
        visitor,
    });
    let current = play_mut(tx);
    current.visitor = Some(visitor);
    current.progress = VisitorProgress::Idle;
    effect.play(tx, &player)
}

/// Ask for a visitor card to play.
pub(crate) fn prompt_visitor_choice(tx: &mut Transaction, player: &PlayerId, season: Season, optional: bool) {
    let cards = selectors::playable_visitors(tx, player, season)
        .into_iter()
        .map(CardId::Visitor)
        .collect();
    let title = match season {
        Season::Summer => "Play a summer visitor",
        Season::Winter => "Play a winter visitor",
    };
    let min = usize::from(!optional);
    tx.push_prompt(Prompt::choose_cards(player.clone(), title, cards, (min, 1)));
}

/// Finish the current visitor. With a play left and a playable card in
/// hand the player may go again; otherwise the turn ends.
pub(crate) fn end_visitor(tx: &mut Transaction) {
    let player = tx.current_player_id().clone();
    let play = play_mut(tx).clone();
    if play.plays_left == 0 || selectors::playable_visitors(tx, &player, play.season).is_empty() {
        turn::end_turn(tx);
        return;
    }

    if let Some(visitor) = play.visitor {
        tx.discard(CardId::Visitor(visitor));
    }
    let next = play_mut(tx);
    next.visitor = None;
    next.progress = VisitorProgress::Idle;
    next.plays_left -= 1;
    prompt_visitor_choice(tx, &player, play.season, true);
}

// === Helpers ===

fn play_mut(tx: &mut Transaction) -> &mut PlayVisitor {
    match &mut tx.current_turn {
        CurrentTurn::WorkerPlacement(WorkerPlacementTurn {
            pending_action: Some(PendingAction::PlayVisitor(play)),
            ..
        }) => play,
        other => panic!("No visitor is being played during {}", other.name()),
    }
}

pub(crate) fn set_progress(tx: &mut Transaction, progress: VisitorProgress) {
    play_mut(tx).progress = progress;
}

/// The player resolving the visitor.
pub(crate) fn owner(tx: &Transaction) -> PlayerId {
    tx.current_player_id().clone()
}

pub(crate) fn actor(action: &Action) -> Result<PlayerId, ActionError> {
    action
        .player_id()
        .cloned()
        .ok_or_else(|| unexpected(action))
}

pub(crate) fn unexpected(action: &Action) -> ActionError {
    ActionError::Rejected(format!("{} does not answer this visitor", action.kind_name()))
}

pub(crate) fn option(choice: VisitorChoice, label: impl Into<String>, disabled: Option<String>) -> Choice {
    Choice::new(ChoiceId::Visitor(choice), label).disabled_if(disabled)
}

/// Queue a visitor's option prompt.
pub(crate) fn offer(tx: &mut Transaction, player: &PlayerId, visitor: VisitorId, choices: Vec<Choice>) {
    tx.push_prompt(Prompt::choose_action(player.clone(), visitor.card().name, choices, Some(visitor)));
}

/// The visitor option picked by a `ChooseAction`.
pub(crate) fn picked(action: &Action) -> Option<VisitorChoice> {
    match action {
        Action::ChooseAction {
            choice: ChoiceId::Visitor(choice),
            ..
        } => Some(*choice),
        _ => None,
    }
}

/// Ask for exactly one grape from the crush pad.
pub(crate) fn prompt_grape(tx: &mut Transaction, player: &PlayerId, visitor: VisitorId, title: &str) {
    let choices = tx
        .player(player)
        .crush_pad
        .grapes()
        .into_iter()
        .map(|g| Choice::new(ChoiceId::Grape(g), board::grape_label(g)))
        .collect();
    tx.push_prompt(Prompt::choose_multi(player.clone(), title, choices, (1, 1), Some(visitor)));
}

/// Ask for a vine to plant.
pub(crate) fn prompt_plant(tx: &mut Transaction, player: &PlayerId, optional: bool) {
    board::prompt_vine_to_plant(tx, player, optional);
}

/// Take a chosen vine out of the hand and ask for its field.
pub(crate) fn take_vine(tx: &mut Transaction, player: &PlayerId, vine: VineId) -> Result<(), ActionError> {
    if selectors::plantable_fields(tx.player(player), vine).is_empty() {
        return Err(ActionError::NotOffered(vine.to_string()));
    }
    tx.take_from_hand(player, CardId::Vine(vine))?;
    board::prompt_field_for_vine(tx, player, vine);
    Ok(())
}

/// Plant the vine waiting for the single field in `action`.
pub(crate) fn plant_into(tx: &mut Transaction, player: &PlayerId, vine: VineId, action: &Action) -> Result<(), ActionError> {
    match action {
        Action::ChooseField { fields, .. } if fields.len() == 1 => tx.plant_vine(player, vine, fields[0]),
        _ => Err(unexpected(action)),
    }
}

/// Advance a `Planting` flow: a vine choice takes the vine from hand, a
/// field choice plants it and offers the next one while plants are left.
/// Returns true once planting is over.
pub(crate) fn planting_step(
    tx: &mut Transaction,
    player: &PlayerId,
    action: &Action,
    vine: Option<VineId>,
    left: u8,
) -> Result<bool, ActionError> {
    match (vine, action) {
        (None, Action::ChooseVine { vine: None, .. }) => Ok(true),
        (None, Action::ChooseVine { vine: Some(chosen), .. }) => {
            take_vine(tx, player, *chosen)?;
            set_progress(
                tx,
                VisitorProgress::Planting {
                    vine: Some(*chosen),
                    left,
                },
            );
            Ok(false)
        }
        (Some(waiting), Action::ChooseField { .. }) => {
            plant_into(tx, player, waiting, action)?;
            let left = left.saturating_sub(1);
            set_progress(tx, VisitorProgress::Planting { vine: None, left });
            if left > 0 && selectors::plant_reason(tx.player(player)).is_none() {
                prompt_plant(tx, player, true);
                Ok(false)
            } else {
                Ok(true)
            }
        }
        _ => Err(unexpected(action)),
    }
}

/// Record one roster answer. Returns the number of opponents who accepted
/// once everybody has answered.
pub(crate) fn roster_answer(
    tx: &mut Transaction,
    actor: &PlayerId,
    mut waiting: Vec<PlayerId>,
    mut accepted: u8,
    took_it: bool,
) -> Result<Option<u8>, ActionError> {
    let Some(index) = waiting.iter().position(|p| p == actor) else {
        return Err(ActionError::Rejected(format!("{actor} already answered")));
    };
    waiting.remove(index);
    if took_it && *actor != owner(tx) {
        accepted += 1;
    }
    if waiting.is_empty() {
        Ok(Some(accepted))
    } else {
        set_progress(tx, VisitorProgress::Roster { waiting, accepted });
        Ok(None)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures for visitor tests: a game paused on a visitor placement.

    use super::*;
    use crate::cards::Deck;
    use crate::core::{PlayerColor, WorkerKind};
    use crate::rules::{apply, try_apply, GameSetup, Placement};

    pub fn viny() -> PlayerId {
        PlayerId::from("viny")
    }

    pub fn stfy() -> PlayerId {
        PlayerId::from("stfy")
    }

    /// Two-player game in `season` where viny holds `visitor`.
    pub fn game_with(visitor: VisitorId) -> GameState {
        let mut state = GameSetup::new()
            .player("viny", PlayerColor::Orange)
            .player("stfy", PlayerColor::Blue)
            .starting_hand("viny", [CardId::Visitor(visitor)])
            .build(Deck::full())
            .unwrap();
        if visitor.season() == Season::Winter {
            if let CurrentTurn::WorkerPlacement(turn) = &mut state.current_turn {
                turn.season = Season::Winter;
            }
            state.prompts = im::vector![Prompt::place_worker(viny(), Season::Winter)];
        }
        state
    }

    pub fn edit(state: &mut GameState, id: &PlayerId, f: impl FnOnce(&mut crate::core::PlayerState)) {
        f(state.players.get_mut(id).unwrap());
    }

    /// Place viny's worker on the visitor space and pick `visitor`.
    pub fn play(state: &GameState, visitor: VisitorId) -> GameState {
        let placement = match visitor.season() {
            Season::Summer => Placement::PlaySummerVisitor,
            Season::Winter => Placement::PlayWinterVisitor,
        };
        let placed = try_apply(
            state,
            &Action::PlaceWorker {
                player_id: viny(),
                placement,
                worker: WorkerKind::Normal,
            },
        )
        .unwrap();
        try_apply(
            &placed,
            &Action::ChooseCards {
                player_id: viny(),
                cards: Some(vec![CardId::Visitor(visitor)]),
            },
        )
        .unwrap()
    }

    pub fn choose(state: &GameState, player: PlayerId, choice: VisitorChoice) -> GameState {
        try_apply(
            state,
            &Action::ChooseAction {
                player_id: player,
                choice: ChoiceId::Visitor(choice),
            },
        )
        .unwrap()
    }

    pub fn answer(state: &GameState, action: Action) -> GameState {
        try_apply(state, &action).unwrap()
    }

    /// True when the visitor is done and the turn moved on.
    pub fn turn_ended(state: &GameState) -> bool {
        state.current_player_id() == &stfy() && state.pending_action().is_none()
    }

    pub fn noop(state: &GameState, action: &Action) -> bool {
        apply(state, action) == *state
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::prompts::PromptKind;

    #[test]
    fn test_every_visitor_has_a_resolver() {
        for id in VisitorId::all() {
            assert_eq!(visitor_effect(id).id(), id);
        }
    }

    #[test]
    fn test_play_binds_visitor_and_logs() {
        let state = play(&game_with(VisitorId::TourGuide), VisitorId::TourGuide);

        let play = state.playing_visitor().unwrap();
        assert_eq!(play.visitor, Some(VisitorId::TourGuide));
        assert!(!state.player(&viny()).holds(CardId::Visitor(VisitorId::TourGuide)));
        let last = state.activity_log.last().unwrap();
        assert!(last.events.contains(&ActivityEvent::Visitor {
            player_id: viny(),
            visitor: VisitorId::TourGuide,
        }));
        assert!(matches!(
            state.prompts[0].kind,
            PromptKind::ChooseAction {
                visitor: Some(VisitorId::TourGuide),
                ..
            }
        ));
    }

    #[test]
    fn test_visitor_card_discarded_at_end() {
        let state = play(&game_with(VisitorId::TourGuide), VisitorId::TourGuide);
        let done = choose(&state, viny(), VisitorChoice::TourGain4);

        assert!(turn_ended(&done));
        assert!(done.discard_piles.contains(CardId::Visitor(VisitorId::TourGuide)));
    }

    #[test]
    fn test_wrong_season_visitor_not_offered() {
        let state = game_with(VisitorId::Judge);
        // Summer space does not exist in winter, and the judge is no summer card.
        let mut summer = state.clone();
        if let CurrentTurn::WorkerPlacement(turn) = &mut summer.current_turn {
            turn.season = Season::Summer;
        }
        summer.prompts = im::vector![Prompt::place_worker(viny(), Season::Summer)];
        let action = Action::PlaceWorker {
            player_id: viny(),
            placement: crate::rules::Placement::PlaySummerVisitor,
            worker: crate::core::WorkerKind::Normal,
        };
        assert!(noop(&summer, &action));
    }

    #[test]
    fn test_limbo_vines() {
        let vine = VineId::new(crate::cards::VineKind::Pinot, 0);
        let planting = VisitorProgress::Planting {
            vine: Some(vine),
            left: 1,
        };
        assert_eq!(planting.limbo_vines(), vec![vine]);
        assert!(VisitorProgress::Idle.limbo_vines().is_empty());
    }
}
