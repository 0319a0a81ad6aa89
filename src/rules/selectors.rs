//! Read-only queries over a snapshot.
//!
//! Most functions here answer "can this player do X?" with a disabled
//! reason: `None` means allowed, `Some(text)` explains why not. Prompts use
//! them to disable choices; handlers use them to re-check answers.

use crate::cards::{
    requirements_met, structure, CardId, CardType, Coupon, OrderId, StructureId, VineId,
    VisitorId,
};
use crate::core::{
    ActionError, BuySellMode, EngineConfig, FieldId, GameState, GrapeColor, PlayerId,
    PlayerState, Season, WineColor, WineIngredients, WineSpec,
};
use crate::rules::placement::Placement;
use crate::visitors::visitor_effect;

/// Coins a grape sells for.
#[must_use]
pub fn grape_price(value: u8) -> u32 {
    match value {
        0..=3 => 1,
        4..=6 => 2,
        _ => 3,
    }
}

/// Reason a player cannot pay `amount`.
#[must_use]
pub fn coins_reason(player: &PlayerState, amount: u32) -> Option<String> {
    (player.coins < amount).then(|| format!("Requires {amount} coins"))
}

/// Reason nothing can be drawn of a type.
#[must_use]
pub fn draw_reason(state: &GameState, card_type: CardType) -> Option<String> {
    (state.draw_piles.pile(card_type).is_empty() && state.discard_piles.pile(card_type).is_empty())
        .then(|| "No cards left to draw".to_string())
}

// === Vines and fields ===

/// Reason the player lacks the structures a vine needs.
#[must_use]
pub fn vine_requirement_reason(player: &PlayerState, vine: VineId) -> Option<String> {
    vine.card()
        .requires
        .iter()
        .find(|&&s| !player.has_structure(s))
        .map(|&s| format!("Requires a {}", structure(s).name))
}

/// Reason `vine` cannot go on a particular field.
#[must_use]
pub fn field_plant_reason(player: &PlayerState, vine: VineId, field_id: FieldId) -> Option<String> {
    let Some(field) = player.field(field_id) else {
        return Some("No such field".into());
    };
    if field.sold {
        return Some("Field was sold".into());
    }
    if !field.has_room_for(vine) {
        return Some(format!("Field value {} would be exceeded", field.value));
    }
    vine_requirement_reason(player, vine)
}

/// Fields a vine can be planted on.
#[must_use]
pub fn plantable_fields(player: &PlayerState, vine: VineId) -> Vec<FieldId> {
    player
        .fields
        .iter()
        .filter(|f| field_plant_reason(player, vine, f.id).is_none())
        .map(|f| f.id)
        .collect()
}

/// Vines in hand that fit on at least one field.
#[must_use]
pub fn plantable_vines(player: &PlayerState) -> Vec<VineId> {
    player
        .hand
        .iter()
        .filter_map(|card| match card {
            CardId::Vine(v) => Some(*v),
            _ => None,
        })
        .filter(|&v| !plantable_fields(player, v).is_empty())
        .collect()
}

#[must_use]
pub fn plant_reason(player: &PlayerState) -> Option<String> {
    plantable_vines(player)
        .is_empty()
        .then(|| "No vine in hand can be planted".to_string())
}

/// Every vine planted on the player's fields, field by field.
#[must_use]
pub fn planted_vines(player: &PlayerState) -> Vec<VineId> {
    player
        .fields
        .iter()
        .flat_map(|f| f.vines.iter().copied())
        .collect()
}

#[must_use]
pub fn uproot_reason(player: &PlayerState) -> Option<String> {
    planted_vines(player)
        .is_empty()
        .then(|| "No vines planted".to_string())
}

/// Owned fields with something to harvest.
#[must_use]
pub fn harvestable_fields(player: &PlayerState) -> Vec<FieldId> {
    player
        .fields
        .iter()
        .filter(|f| !f.sold && !f.is_empty())
        .map(|f| f.id)
        .collect()
}

#[must_use]
pub fn harvest_reason(player: &PlayerState) -> Option<String> {
    harvestable_fields(player)
        .is_empty()
        .then(|| "No fields to harvest".to_string())
}

/// Pairs of vines on different fields that can trade places.
#[must_use]
pub fn swappable_pairs(player: &PlayerState) -> Vec<(VineId, VineId)> {
    let mut pairs = Vec::new();
    for a_field in player.fields.iter().filter(|f| !f.sold) {
        for b_field in player.fields.iter().filter(|f| !f.sold && f.id > a_field.id) {
            for &a in &a_field.vines {
                for &b in &b_field.vines {
                    let a_total = a.card().yields.total();
                    let b_total = b.card().yields.total();
                    let a_after = a_field.planted_value() - a_total + b_total;
                    let b_after = b_field.planted_value() - b_total + a_total;
                    if a_after <= a_field.value && b_after <= b_field.value {
                        pairs.push((a, b));
                    }
                }
            }
        }
    }
    pairs
}

/// Vines that can trade places with `vine`.
#[must_use]
pub fn swap_partners(player: &PlayerState, vine: VineId) -> Vec<VineId> {
    swappable_pairs(player)
        .into_iter()
        .filter_map(|(a, b)| {
            if a == vine {
                Some(b)
            } else if b == vine {
                Some(a)
            } else {
                None
            }
        })
        .collect()
}

// === Structures ===

/// Reason one structure cannot be built with `coupon`.
#[must_use]
pub fn structure_reason(player: &PlayerState, id: StructureId, coupon: Option<Coupon>) -> Option<String> {
    if player.has_structure(id) {
        return Some("Already built".into());
    }
    if let Some(required) = structure(id).requires {
        if !player.has_structure(required) {
            return Some(format!("Requires a {}", structure(required).name));
        }
    }
    match Coupon::price(coupon, id.cost()) {
        None => Some("Too expensive for this coupon".into()),
        Some(price) => coins_reason(player, u32::from(price)),
    }
}

/// Structures the player can build right now.
#[must_use]
pub fn buildable_structures(player: &PlayerState, coupon: Option<Coupon>) -> Vec<StructureId> {
    StructureId::ALL
        .into_iter()
        .filter(|&s| structure_reason(player, s, coupon).is_none())
        .collect()
}

#[must_use]
pub fn build_reason(player: &PlayerState, coupon: Option<Coupon>) -> Option<String> {
    buildable_structures(player, coupon)
        .is_empty()
        .then(|| "No structure can be built".to_string())
}

// === Workers ===

#[must_use]
pub fn train_reason(player: &PlayerState, config: &EngineConfig, cost: u32) -> Option<String> {
    if player.trained_workers() >= usize::from(config.max_workers) {
        return Some(format!("Already has {} workers", config.max_workers));
    }
    coins_reason(player, cost)
}

// === Grapes, wine and orders ===

#[must_use]
pub fn grapes_reason(player: &PlayerState) -> Option<String> {
    player
        .crush_pad
        .is_empty()
        .then(|| "No grapes on the crush pad".to_string())
}

/// Reason the cellar holds no wine of at least `min_value`.
#[must_use]
pub fn wine_reason(player: &PlayerState, min_value: u8) -> Option<String> {
    (!player.cellar.wines().iter().any(|w| w.value >= min_value))
        .then(|| format!("Requires a wine of value {min_value} or more"))
}

/// The wine a recipe would make, before devaluation.
pub fn recipe_value(player: &PlayerState, ingredients: &WineIngredients) -> Result<WineSpec, ActionError> {
    let reds = ingredients.grapes.iter().filter(|g| g.color == GrapeColor::Red).count();
    let whites = ingredients.grapes.len() - reds;

    let (need_red, need_white, cellar) = match ingredients.wine {
        WineColor::Red => (1, 0, None),
        WineColor::White => (0, 1, None),
        WineColor::Blush => (1, 1, Some(StructureId::MediumCellar)),
        WineColor::Sparkling => (2, 1, Some(StructureId::LargeCellar)),
    };
    if reds != need_red || whites != need_white {
        return Err(ActionError::InvalidRecipe(format!(
            "{:?} wine takes {need_red} red and {need_white} white grapes",
            ingredients.wine
        )));
    }
    if let Some(cellar) = cellar {
        if !player.has_structure(cellar) {
            return Err(ActionError::InvalidRecipe(format!(
                "{:?} wine requires a {}",
                ingredients.wine,
                structure(cellar).name
            )));
        }
    }

    let sum: u8 = ingredients.grapes.iter().map(|g| g.value).sum();
    let value = sum.min(player.wine_cap());
    if value < ingredients.wine.floor() {
        return Err(ActionError::InvalidRecipe(format!(
            "{:?} wine needs value {} or more",
            ingredients.wine,
            ingredients.wine.floor()
        )));
    }
    Ok(WineSpec::new(ingredients.wine, value))
}

/// Orders in hand the cellar can fill.
#[must_use]
pub fn fillable_orders(player: &PlayerState) -> Vec<OrderId> {
    let wines = player.cellar.wines();
    player
        .hand
        .iter()
        .filter_map(|card| match card {
            CardId::Order(o) => Some(*o),
            _ => None,
        })
        .filter(|o| requirements_met(o.card().wines, &wines))
        .collect()
}

/// Highest wine value in any cellar.
#[must_use]
pub fn most_valuable_wine(state: &GameState) -> Option<u8> {
    state
        .players_in_order()
        .flat_map(|p| p.cellar.wines())
        .map(|w| w.value)
        .max()
}

// === Buy / sell ===

#[must_use]
pub fn buy_sell_reason(player: &PlayerState, mode: BuySellMode) -> Option<String> {
    match mode {
        BuySellMode::SellGrapes => grapes_reason(player),
        BuySellMode::BuyField => {
            let cheapest = player.fields.iter().filter(|f| f.sold).map(|f| f.value).min();
            match cheapest {
                None => Some("No sold fields".into()),
                Some(value) => coins_reason(player, u32::from(value)),
            }
        }
        BuySellMode::SellField => (!player.fields.iter().any(|f| !f.sold && f.is_empty()))
            .then(|| "No empty fields to sell".to_string()),
    }
}

// === Visitors ===

/// Visitors in hand of `season` that can be played now.
#[must_use]
pub fn playable_visitors(state: &GameState, player_id: &PlayerId, season: Season) -> Vec<VisitorId> {
    state
        .player(player_id)
        .hand
        .iter()
        .filter_map(|card| match card {
            CardId::Visitor(v) if v.season() == season => Some(*v),
            _ => None,
        })
        .filter(|&v| visitor_effect(v).unplayable_reason(state, player_id).is_none())
        .collect()
}

// === Placements ===

/// Reason a worker cannot go on a space, ignoring capacity.
#[must_use]
pub fn placement_reason(state: &GameState, player_id: &PlayerId, placement: Placement, bonus: bool) -> Option<String> {
    let player = state.player(player_id);
    let discount = u8::from(bonus);
    match placement {
        Placement::DrawVine => draw_reason(state, CardType::Vine),
        Placement::DrawOrder => draw_reason(state, CardType::Order),
        Placement::GiveTour | Placement::GainCoin => None,
        Placement::BuildStructure => build_reason(player, Some(Coupon::Discount { amount: discount })),
        Placement::PlaySummerVisitor => playable_visitors(state, player_id, Season::Summer)
            .is_empty()
            .then(|| "No playable summer visitors".to_string()),
        Placement::PlayWinterVisitor => playable_visitors(state, player_id, Season::Winter)
            .is_empty()
            .then(|| "No playable winter visitors".to_string()),
        Placement::BuySell => {
            let modes = [BuySellMode::SellGrapes, BuySellMode::BuyField, BuySellMode::SellField];
            modes
                .iter()
                .all(|&m| buy_sell_reason(player, m).is_some())
                .then(|| "Nothing to buy or sell".to_string())
        }
        Placement::PlantVine => plant_reason(player),
        Placement::HarvestField => harvest_reason(player),
        Placement::TrainWorker => {
            let cost = state.config.train_worker_cost.saturating_sub(u32::from(discount));
            train_reason(player, &state.config, cost)
        }
        Placement::MakeWine => grapes_reason(player),
        Placement::FillOrder => fillable_orders(player)
            .is_empty()
            .then(|| "No order can be filled".to_string()),
        Placement::Yoke => {
            if !player.structure_ready(StructureId::Yoke) {
                Some("Requires an unused yoke".into())
            } else if harvest_reason(player).is_some() && uproot_reason(player).is_some() {
                Some("Nothing to harvest or uproot".into())
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{StructureState, VineKind};
    use crate::core::{GrapeSpec, PlayerColor};

    fn player() -> PlayerState {
        PlayerState::new(PlayerId::from("viny"), PlayerColor::Orange, &EngineConfig::default())
    }

    #[test]
    fn test_grape_price() {
        assert_eq!(grape_price(1), 1);
        assert_eq!(grape_price(3), 1);
        assert_eq!(grape_price(4), 2);
        assert_eq!(grape_price(7), 3);
        assert_eq!(grape_price(9), 3);
    }

    #[test]
    fn test_vine_structure_requirement() {
        let mut p = player();
        let syrah = VineId::new(VineKind::Syrah, 0);
        assert_eq!(vine_requirement_reason(&p, syrah).as_deref(), Some("Requires a Trellis"));

        p.structures.insert(StructureId::Trellis, StructureState::Built);
        assert_eq!(vine_requirement_reason(&p, syrah), None);
    }

    #[test]
    fn test_plantable_vines_respect_capacity() {
        let mut p = player();
        p.structures.insert(StructureId::Irrigation, StructureState::Built);
        let chardonnay = VineId::new(VineKind::Chardonnay, 0);
        p.hand.push_back(CardId::Vine(chardonnay));
        for field in p.fields.iter_mut() {
            field.vines.push_back(VineId::new(VineKind::Trebbiano, field.id.raw()));
        }
        // 5 - 2 = 3 left on field 0; fields 1 and 2 still have room for 4
        assert_eq!(plantable_fields(&p, chardonnay), vec![FieldId::new(1), FieldId::new(2)]);
        assert_eq!(plantable_vines(&p), vec![chardonnay]);
    }

    #[test]
    fn test_structure_reason() {
        let mut p = player();
        p.coins = 5;
        assert!(structure_reason(&p, StructureId::LargeCellar, None).is_some());
        assert!(structure_reason(&p, StructureId::TastingRoom, None).is_some());
        assert!(structure_reason(&p, StructureId::TastingRoom, Some(Coupon::Discount { amount: 1 })).is_none());
        assert!(structure_reason(&p, StructureId::Cottage, Some(Coupon::Voucher { up_to: 3 })).is_some());
    }

    #[test]
    fn test_recipes() {
        let mut p = player();
        let red = WineIngredients::new(WineColor::Red, &[GrapeSpec::red(5)]);
        assert_eq!(recipe_value(&p, &red), Ok(WineSpec::new(WineColor::Red, 3)));

        let blush = WineIngredients::new(WineColor::Blush, &[GrapeSpec::red(2), GrapeSpec::white(3)]);
        assert!(recipe_value(&p, &blush).is_err());
        p.structures.insert(StructureId::MediumCellar, StructureState::Built);
        assert_eq!(recipe_value(&p, &blush), Ok(WineSpec::new(WineColor::Blush, 5)));

        let weak = WineIngredients::new(WineColor::Blush, &[GrapeSpec::red(1), GrapeSpec::white(1)]);
        assert!(recipe_value(&p, &weak).is_err());

        let wrong = WineIngredients::new(WineColor::White, &[GrapeSpec::red(1)]);
        assert!(recipe_value(&p, &wrong).is_err());
    }

    #[test]
    fn test_swappable_pairs() {
        let mut p = player();
        let big = VineId::new(VineKind::Trebbiano, 0);
        let small = VineId::new(VineKind::Sangiovese, 0);
        p.fields[0].vines.push_back(small);
        p.fields[0].vines.push_back(VineId::new(VineKind::Malvasia, 0));
        p.fields[0].vines.push_back(VineId::new(VineKind::Malvasia, 1));
        p.fields[0].vines.push_back(VineId::new(VineKind::Malvasia, 2));
        p.fields[1].vines.push_back(big);
        // Field 0 is at 4 of 5: swapping the 1 for a 2 fits.
        assert_eq!(swap_partners(&p, big), vec![small, VineId::new(VineKind::Malvasia, 0), VineId::new(VineKind::Malvasia, 1), VineId::new(VineKind::Malvasia, 2)]);
    }

    #[test]
    fn test_buy_sell_reasons() {
        let mut p = player();
        assert!(buy_sell_reason(&p, BuySellMode::SellGrapes).is_some());
        assert!(buy_sell_reason(&p, BuySellMode::BuyField).is_some());
        assert!(buy_sell_reason(&p, BuySellMode::SellField).is_none());

        p.fields[0].sold = true;
        assert_eq!(buy_sell_reason(&p, BuySellMode::BuyField).as_deref(), Some("Requires 5 coins"));
    }
}
