//! Tunnel mining-cost estimate.

use serde::Serialize;

/// Expected share of tiles that turn out to be ore veins.
pub const ORE_PROBABILITY: f64 = 1.0 / 20.0;
pub const AVG_ACTIONS_PER_ORE_VEIN: u64 = 5000;
pub const ACTIONS_PER_STONE_TILE: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelCost {
    pub total_tiles: u64,
    pub total_ore_veins: u64,
    pub stone_actions: u64,
    pub ore_actions: u64,
    pub floor_amount: u64,
    pub wall_amount: u64,
}

impl TunnelCost {
    pub fn total_actions(&self) -> u64 {
        self.stone_actions + self.ore_actions
    }
}

/// Deterministic expectation; the ore vein count is rounded up. Only the two
/// long walls are lined, whatever the width.
pub fn calc_tunnel_cost(length: u32, width: u32) -> TunnelCost {
    let total_tiles = u64::from(length) * u64::from(width);
    let total_ore_veins = (total_tiles as f64 * ORE_PROBABILITY).ceil() as u64;
    let stone_tiles = total_tiles - total_ore_veins;

    TunnelCost {
        total_tiles,
        total_ore_veins,
        stone_actions: stone_tiles * ACTIONS_PER_STONE_TILE,
        ore_actions: total_ore_veins * AVG_ACTIONS_PER_ORE_VEIN,
        floor_amount: total_tiles,
        wall_amount: u64::from(length) * 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost(
        total_tiles: u64,
        total_ore_veins: u64,
        stone_actions: u64,
        ore_actions: u64,
        floor_amount: u64,
        wall_amount: u64,
    ) -> TunnelCost {
        TunnelCost {
            total_tiles,
            total_ore_veins,
            stone_actions,
            ore_actions,
            floor_amount,
            wall_amount,
        }
    }

    #[test]
    fn empty_tunnel() {
        assert_eq!(calc_tunnel_cost(0, 0), cost(0, 0, 0, 0, 0, 0));
    }

    #[test]
    fn single_width_tunnels() {
        assert_eq!(
            calc_tunnel_cost(50, 1),
            cost(50, 3, 2350, 15000, 50, 100)
        );
        assert_eq!(
            calc_tunnel_cost(100, 1),
            cost(100, 5, 4750, 25000, 100, 200)
        );
    }

    #[test]
    fn wider_tunnels_only_line_two_walls() {
        assert_eq!(
            calc_tunnel_cost(50, 2),
            cost(100, 5, 4750, 25000, 100, 100)
        );
        assert_eq!(
            calc_tunnel_cost(50, 3),
            cost(150, 8, 7100, 40000, 150, 100)
        );
        assert_eq!(
            calc_tunnel_cost(75, 3),
            cost(225, 12, 10650, 60000, 225, 150)
        );
    }

    #[test]
    fn total_actions_adds_both_kinds() {
        assert_eq!(calc_tunnel_cost(50, 1).total_actions(), 17350);
    }
}
