//! A small solitaire catalog and the "select game" tree built from it.

use std::thread;
use std::time::Duration;

use crate::tree::node::{Contents, NodeSpec};

pub type GameId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameKind {
    Klondike,
    FreeCell,
    Spider,
    Golf,
    Yukon,
}

impl GameKind {
    pub const ALL: [GameKind; 5] = [
        GameKind::Klondike,
        GameKind::FreeCell,
        GameKind::Spider,
        GameKind::Golf,
        GameKind::Yukon,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GameKind::Klondike => "Klondike type",
            GameKind::FreeCell => "FreeCell type",
            GameKind::Spider => "Spider type",
            GameKind::Golf => "Golf type",
            GameKind::Yukon => "Yukon type",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub name: &'static str,
    pub kind: GameKind,
    pub decks: u8,
    pub description: &'static str,
}

pub const GAMES: &[Game] = &[
    Game {
        id: 2,
        name: "Klondike",
        kind: GameKind::Klondike,
        decks: 1,
        description: "Build down in alternate colors; turn the stock one card at a time.",
    },
    Game {
        id: 3,
        name: "Whitehead",
        kind: GameKind::Klondike,
        decks: 1,
        description: "Klondike dealt face up, building down in the same color.",
    },
    Game {
        id: 19,
        name: "Gargantua",
        kind: GameKind::Klondike,
        decks: 2,
        description: "Two-deck Klondike with nine piles and two passes through the stock.",
    },
    Game {
        id: 5,
        name: "FreeCell",
        kind: GameKind::FreeCell,
        decks: 1,
        description: "All cards dealt face up; four free cells hold single cards.",
    },
    Game {
        id: 46,
        name: "Baker's Game",
        kind: GameKind::FreeCell,
        decks: 1,
        description: "FreeCell building down by suit instead of alternate colors.",
    },
    Game {
        id: 10,
        name: "Spider",
        kind: GameKind::Spider,
        decks: 2,
        description: "Build full suits from King to Ace to remove them from play.",
    },
    Game {
        id: 11,
        name: "Scorpion",
        kind: GameKind::Spider,
        decks: 1,
        description: "Any face-up card may be moved with the cards above it.",
    },
    Game {
        id: 36,
        name: "Golf",
        kind: GameKind::Golf,
        decks: 1,
        description: "Move cards one rank up or down onto the waste pile.",
    },
    Game {
        id: 37,
        name: "Black Hole",
        kind: GameKind::Golf,
        decks: 1,
        description: "Golf around a central Ace of Spades, wrapping from King to Ace.",
    },
    Game {
        id: 12,
        name: "Yukon",
        kind: GameKind::Yukon,
        decks: 1,
        description: "Move any face-up group regardless of sequence.",
    },
    Game {
        id: 13,
        name: "Russian Solitaire",
        kind: GameKind::Yukon,
        decks: 1,
        description: "Yukon building down by suit.",
    },
];

pub fn find(id: GameId) -> Option<&'static Game> {
    GAMES.iter().find(|game| game.id == id)
}

fn leaves<'a>(games: impl IntoIterator<Item = &'a Game>) -> Vec<NodeSpec<GameId>> {
    games
        .into_iter()
        .map(|game| NodeSpec::leaf(game.id, game.name))
        .collect()
}

fn by_kind() -> Vec<NodeSpec<GameId>> {
    let mut branches: Vec<NodeSpec<GameId>> = GameKind::ALL
        .iter()
        .map(|kind| {
            NodeSpec::branch(
                kind.label(),
                Contents::fixed(leaves(GAMES.iter().filter(|game| game.kind == *kind))),
            )
        })
        .collect();
    branches.push(NodeSpec::branch(
        "Mahjongg type",
        Contents::fixed(vec![NodeSpec::placeholder("(no games installed)")]),
    ));
    branches
}

fn by_decks() -> Vec<NodeSpec<GameId>> {
    [(1u8, "1 deck games"), (2, "2 deck games")]
        .into_iter()
        .map(|(decks, label)| {
            NodeSpec::branch(
                label,
                Contents::lazy(move || leaves(GAMES.iter().filter(|game| game.decks == decks))),
            )
        })
        .collect()
}

/// Pretend to read the play history from disk.
fn recently_played(delay: Duration) -> Vec<NodeSpec<GameId>> {
    thread::sleep(delay);
    leaves([2, 10, 36].iter().filter_map(|id| find(*id)))
}

/// Roots of the game selection tree.
///
/// "All games" and the deck-count branches are generated on first expansion;
/// "Recently played" starts loading in the background straight away.
pub fn game_tree() -> Vec<NodeSpec<GameId>> {
    vec![
        NodeSpec::placeholder("(no game)"),
        NodeSpec::branch(
            "All games",
            Contents::lazy(|| {
                let mut games: Vec<&Game> = GAMES.iter().collect();
                games.sort_by_key(|game| game.name);
                leaves(games)
            }),
        ),
        NodeSpec::branch("By type", Contents::fixed(by_kind())).expanded(true),
        NodeSpec::branch("By number of decks", Contents::lazy(by_decks)),
        NodeSpec::branch(
            "Recently played",
            Contents::background(|| recently_played(Duration::from_millis(50))),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::NodeArena;

    #[test]
    fn every_leaf_names_a_known_game() {
        let mut arena = NodeArena::new(game_tree());
        let roots = arena.roots().to_vec();
        for root in roots {
            if arena.get(root).unwrap().is_leaf() {
                continue;
            }
            let children = arena.contents(root).unwrap().to_vec();
            for child in children {
                if !arena.get(child).unwrap().is_leaf() {
                    arena.contents(child).unwrap();
                }
            }
        }
        for id in 0..arena.len() {
            let node = arena.get(id).unwrap();
            if let Some(key) = node.key() {
                assert_eq!(find(*key).map(|game| game.name), Some(node.text.as_str()));
            }
        }
    }

    #[test]
    fn all_games_are_sorted_by_name() {
        let mut arena = NodeArena::new(game_tree());
        let all = arena.roots()[1];
        let children = arena.contents(all).unwrap().to_vec();
        let names: Vec<&str> = children
            .iter()
            .map(|id| arena.get(*id).unwrap().text.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), GAMES.len());
    }

    #[test]
    fn by_type_lists_every_kind_and_a_placeholder() {
        let kinds = by_kind();
        assert_eq!(kinds.len(), GameKind::ALL.len() + 1);
        assert_eq!(kinds.last().unwrap().text, "Mahjongg type");
    }
}
