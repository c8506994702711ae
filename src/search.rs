//! 探索アルゴリズムモジュール
//!
//! NegaScout(反復深化 + 深さ別置換表 + ProbCut)と、終盤用の
//! 勝敗判定ソルバ・完全読みソルバを実装する。探索状態は[`Searcher`]が
//! 抱え込み、グローバル状態を持たない。並行に探索したければ
//! `Searcher`を探索ごとに分ければよい。

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::board::{Board, Game, MoveVisitor};
use crate::moves::Move;
use crate::piece;

/// タイムアウトを確認する訪問ノード数の間隔。
const CHECKPOINT_INTERVAL: u64 = 10_000;

const SCORE_INF: i32 = i32::MAX;

// 初手の定石。コードで書くと
// 56t2 65u0 66p4 56o4 56t6 65o6 66t0 64r2 55t2 75o2。
#[rustfmt::skip]
pub(crate) const GOOD_FIRST_MOVES: [Move; 10] = [
    Move::new(4, 5, 19 << 3 | 2), // 56t2
    Move::new(5, 4, 20 << 3),     // 65u0
    Move::new(5, 5, 15 << 3 | 4), // 66p4
    Move::new(4, 5, 14 << 3 | 4), // 56o4
    Move::new(4, 5, 19 << 3 | 6), // 56t6
    Move::new(5, 4, 14 << 3 | 6), // 65o6
    Move::new(5, 5, 19 << 3),     // 66t0
    Move::new(5, 3, 17 << 3 | 2), // 64r2
    Move::new(4, 4, 19 << 3 | 2), // 55t2
    Move::new(6, 4, 14 << 3 | 2), // 75o2
];

/// 勝敗判定ソルバが制限時間を超えた。
#[derive(Debug, Error, PartialEq, Eq)]
#[error("search timed out")]
pub struct Timeout;

/// 探索結果: 最善手とその評価値。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.best_move, self.score)
    }
}

// 深さ1層ぶんの置換表。値は(下限, 上限)。
type TransTable<G> = HashMap<<G as Game>::Key, (i32, i32)>;

// 勝敗判定・完全読み用。値は紫手番に正規化した評価値。
type SolverTable<G> = HashMap<<G as Game>::Key, i32>;

// 序盤はペントミノ以外を候補から外す。ミニ版には五目ピースが
// 存在しないので対象外。
fn move_filter<G: Game>(letter: char, board: &Board<G>) -> bool {
    !(G::NUM_PIECES > 9 && board.turn() < 8 && letter < 'j')
}

// 子局面と並べ替え用スコア。スコアは前回反復の1層深い置換表から
// 種付けし、なければ静的評価で代用する。
struct Child<G: Game> {
    board: Board<G>,
    score: i32,
    mv: Move,
}

impl<G: Game> Child<G> {
    fn new(parent: &Board<G>, m: Move, hash: &TransTable<G>) -> Child<G> {
        let board = parent.child(m);
        let score = match hash.get(board.key()) {
            Some(&(lo, hi)) if lo > -SCORE_INF && hi < SCORE_INF => (lo + hi) / 2 - 1000,
            _ => board.nega_eval(),
        };
        Child { board, score, mv: m }
    }
}

struct ChildCollector<'a, G: Game> {
    board: &'a Board<G>,
    hash: &'a TransTable<G>,
    children: Vec<Child<G>>,
}

impl<G: Game> MoveVisitor<G> for ChildCollector<'_, G> {
    fn filter(&mut self, letter: char, _orientation: u8, board: &Board<G>) -> bool {
        move_filter(letter, board)
    }

    fn visit_move(&mut self, m: Move) -> bool {
        self.children.push(Child::new(self.board, m, self.hash));
        true
    }
}

// 末端(深さ1)用: 子を作らず静的評価でα-βを回す。
struct AlphaBetaVisitor<'a, G: Game> {
    node: &'a Board<G>,
    alpha: i32,
    beta: i32,
    visited_nodes: &'a mut u64,
}

impl<G: Game> MoveVisitor<G> for AlphaBetaVisitor<'_, G> {
    fn filter(&mut self, letter: char, _orientation: u8, board: &Board<G>) -> bool {
        move_filter(letter, board)
    }

    fn visit_move(&mut self, m: Move) -> bool {
        *self.visited_nodes += 1;
        let v = -self.node.child(m).nega_eval();
        if v > self.alpha {
            self.alpha = v;
            if self.alpha >= self.beta {
                return false;
            }
        }
        true
    }
}

/// 探索エンジン。1インスタンス = 1探索系列。
///
/// 訪問ノード数は探索をまたいで積算される(リセットは
/// [`Searcher::reset_visited_nodes`])。
pub struct Searcher {
    visited_nodes: u64,
    check_point: u64,
    deadline: Instant,
    enable_timeout: bool,
    timed_out: bool,
    rng: StdRng,
}

impl Searcher {
    pub fn new() -> Searcher {
        Searcher::with_rng(StdRng::from_entropy())
    }

    /// 定石選択を再現可能にしたいとき用。
    pub fn with_seed(seed: u64) -> Searcher {
        Searcher::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Searcher {
        Searcher {
            visited_nodes: 0,
            check_point: 0,
            deadline: Instant::now(),
            enable_timeout: false,
            timed_out: false,
            rng,
        }
    }

    #[inline]
    pub fn visited_nodes(&self) -> u64 {
        self.visited_nodes
    }

    pub fn reset_visited_nodes(&mut self) {
        self.visited_nodes = 0;
        self.check_point = CHECKPOINT_INTERVAL;
    }

    /// 反復深化つきNegaScout。`stop_ms`を超えたら次の反復に入らず、
    /// `timeout_ms`を超えたら反復の途中でも打ち切る。打ち切り時は
    /// 完了済みの最後の反復の手と評価値を返す。
    pub fn negascout<G: Game>(
        &mut self,
        node: &Board<G>,
        max_depth: i32,
        stop_ms: u64,
        timeout_ms: u64,
    ) -> SearchResult {
        let start = Instant::now();
        self.deadline = start + Duration::from_millis(timeout_ms);
        self.check_point = self.visited_nodes + CHECKPOINT_INTERVAL;
        self.timed_out = false;
        // 最初の反復は打ち切らない。必ず1つは手を確定させる。
        self.enable_timeout = false;

        let mut best_move = Move::invalid();
        let mut score = 0;
        let layers = max_depth.max(2) as usize;
        let mut prev_hash: Vec<TransTable<G>> = vec![TransTable::<G>::default(); layers];

        for depth in 2..=max_depth {
            let mut hash: Vec<TransTable<G>> = vec![TransTable::<G>::default(); layers];
            let mut mv = Move::invalid();
            let s = self.negascout_rec(
                node,
                depth,
                -SCORE_INF,
                SCORE_INF,
                Some(&mut mv),
                &mut hash,
                &prev_hash,
                8,
            );
            if self.timed_out {
                break;
            }
            best_move = mv;
            score = s;
            prev_hash = hash;
            self.enable_timeout = true;
            if start.elapsed() >= Duration::from_millis(stop_ms) {
                break;
            }
        }

        SearchResult { best_move, score }
    }

    #[allow(clippy::too_many_arguments)]
    fn negascout_rec<G: Game>(
        &mut self,
        node: &Board<G>,
        depth: i32,
        mut alpha: i32,
        mut beta: i32,
        mut best_move: Option<&mut Move>,
        hash: &mut [TransTable<G>],
        prev_hash: &[TransTable<G>],
        hash_depth: i32,
    ) -> i32 {
        debug_assert!(alpha <= beta);

        self.visited_nodes += 1;
        if self.visited_nodes >= self.check_point && self.enable_timeout {
            if Instant::now() >= self.deadline {
                self.timed_out = true;
                return 0;
            }
            self.check_point += CHECKPOINT_INTERVAL;
        }

        if depth <= 1 {
            let mut visitor = AlphaBetaVisitor {
                node,
                alpha,
                beta,
                visited_nodes: &mut self.visited_nodes,
            };
            return if node.visit_moves(&mut visitor) {
                visitor.alpha
            } else {
                visitor.beta
            };
        }

        let use_hash = hash_depth > 0;
        if use_hash {
            let (lo, hi) = *hash[0]
                .entry(*node.key())
                .or_insert((-SCORE_INF, SCORE_INF));
            if hi <= alpha {
                return hi;
            }
            if lo >= beta {
                return lo;
            }
            if lo == hi {
                return lo;
            }
            alpha = alpha.max(lo);
            beta = beta.min(hi);
        }

        // ProbCut: 浅い探索でβ超え/α割れの見込みを立て、有意なら
        // 深い探索を省く。確証の探索は置換表に書かない(hash_depth = 0)。
        if let Some(pc) = G::probcut_entry(node.turn(), depth) {
            let thresh = if node.turn() >= 15 { 2.0 } else { 1.6 };

            if beta < SCORE_INF {
                let bound = ((thresh * pc.sigma + beta as f64 - pc.b) / pc.a).round() as i32;
                let r =
                    self.negascout_rec(node, pc.depth, bound - 1, bound, None, hash, prev_hash, 0);
                if self.timed_out {
                    return 0;
                }
                if r >= bound {
                    if use_hash {
                        let entry = hash[0]
                            .entry(*node.key())
                            .or_insert((-SCORE_INF, SCORE_INF));
                        entry.0 = entry.0.max(beta);
                    }
                    return beta;
                }
            }
            if alpha > -SCORE_INF {
                let bound = ((-thresh * pc.sigma + alpha as f64 - pc.b) / pc.a).round() as i32;
                let r =
                    self.negascout_rec(node, pc.depth, bound, bound + 1, None, hash, prev_hash, 0);
                if self.timed_out {
                    return 0;
                }
                if r <= bound {
                    if use_hash {
                        let entry = hash[0]
                            .entry(*node.key())
                            .or_insert((-SCORE_INF, SCORE_INF));
                        entry.1 = entry.1.min(alpha);
                    }
                    return alpha;
                }
            }
        }

        let mut children = {
            let mut collector = ChildCollector {
                board: node,
                hash: &prev_hash[1],
                children: Vec::new(),
            };
            node.visit_moves(&mut collector);
            collector.children
        };
        // 相手にとって良い(自分に悪い)順。最善の反駁から調べる。
        children.sort_by_key(|c| c.score);

        let mut found_pv = false;
        let mut score_max = -SCORE_INF;
        let mut a = alpha;

        for child in &children {
            let mut score;
            if found_pv {
                score = -self.negascout_rec(
                    &child.board,
                    depth - 1,
                    -a - 1,
                    -a,
                    None,
                    &mut hash[1..],
                    &prev_hash[1..],
                    hash_depth - 1,
                );
                if self.timed_out {
                    return 0;
                }
                if score > a && score < beta {
                    // null windowで上がった手は正しい窓で探し直す。
                    score = -self.negascout_rec(
                        &child.board,
                        depth - 1,
                        -beta,
                        -score,
                        None,
                        &mut hash[1..],
                        &prev_hash[1..],
                        hash_depth - 1,
                    );
                    if self.timed_out {
                        return 0;
                    }
                }
            } else {
                score = -self.negascout_rec(
                    &child.board,
                    depth - 1,
                    -beta,
                    -a,
                    None,
                    &mut hash[1..],
                    &prev_hash[1..],
                    hash_depth - 1,
                );
                if self.timed_out {
                    return 0;
                }
            }

            if score >= beta {
                if use_hash {
                    let entry = hash[0]
                        .entry(*node.key())
                        .or_insert((-SCORE_INF, SCORE_INF));
                    entry.0 = entry.0.max(score);
                }
                return score;
            }
            if score > score_max {
                if score > a {
                    a = score;
                }
                if score > alpha {
                    found_pv = true;
                    if let Some(bm) = best_move.as_mut() {
                        **bm = child.mv;
                    }
                }
                score_max = score;
            }
        }

        if use_hash {
            let entry = hash[0]
                .entry(*node.key())
                .or_insert((-SCORE_INF, SCORE_INF));
            if score_max > alpha {
                *entry = (score_max, score_max);
            } else {
                entry.1 = entry.1.min(score_max);
            }
        }
        score_max
    }

    /// 勝敗判定ソルバ。評価値の符号だけに意味がある: 正なら勝ち、
    /// 0なら引き分け、負なら負け。時間切れならそれまでに確定した
    /// 最善手を返す。
    pub fn wld<G: Game>(&mut self, node: &Board<G>, timeout_sec: u64) -> SearchResult {
        self.deadline = Instant::now() + Duration::from_secs(timeout_sec);
        self.check_point = self.visited_nodes + CHECKPOINT_INTERVAL;
        self.visited_nodes += 1;

        let mut hash = solver_tables::<G>(node.turn());

        let mut alpha = -SCORE_INF;
        let beta = SCORE_INF;
        let mut wld_move = Move::invalid();

        for m in node.valid_moves() {
            let child = node.child(m);
            match self.wld_rec(&child, -beta, -alpha, &mut hash) {
                Ok(v) => {
                    let v = -v;
                    if v > alpha {
                        alpha = v;
                        wld_move = m;
                        if alpha > 0 || alpha >= beta {
                            break;
                        }
                    }
                }
                Err(Timeout) => break,
            }
        }
        SearchResult {
            best_move: wld_move,
            score: alpha,
        }
    }

    fn wld_rec<G: Game>(
        &mut self,
        node: &Board<G>,
        mut alpha: i32,
        beta: i32,
        hash: &mut [SolverTable<G>],
    ) -> Result<i32, Timeout> {
        if let Some(&v) = hash[0].get(node.key()) {
            return Ok(if node.is_violet_turn() { v } else { -v });
        }

        self.visited_nodes += 1;
        if self.visited_nodes >= self.check_point {
            if Instant::now() >= self.deadline {
                return Err(Timeout);
            }
            self.check_point += CHECKPOINT_INTERVAL;
        }

        let valid_moves = node.valid_moves();
        if valid_moves[0].is_pass() {
            // パスしかない: 負けが確定していればそのまま返す。
            // 同点なら1手だけ先を見て、相手もパスなら引き分け、
            // 相手が動けるなら最小ピースぶん負ける。
            let score = node.relative_score();
            if score < 0 {
                return Ok(score);
            } else if score == 0 {
                let next = node.child(valid_moves[0]).valid_moves();
                if next[0].is_pass() {
                    return Ok(0);
                }
                return Ok(-(piece::block(next[0].block_id()).size as i32));
            }
        }

        for &m in &valid_moves {
            let child = node.child(m);
            let v = -self.wld_rec(&child, -beta, -alpha, &mut hash[1..])?;
            if v > alpha {
                alpha = v;
                if alpha > 0 || alpha >= beta {
                    break;
                }
            }
        }
        hash[0].insert(
            *node.key(),
            if node.is_violet_turn() { alpha } else { -alpha },
        );
        Ok(alpha)
    }

    /// 完全読みソルバ。終盤局面の正確な得点差と最善手を返す。
    /// 制限時間はない。
    pub fn perfect<G: Game>(&mut self, node: &Board<G>) -> SearchResult {
        let mut hash = solver_tables::<G>(node.turn());
        self.visited_nodes += 1;

        let mut alpha = -SCORE_INF;
        let beta = SCORE_INF;
        let mut perfect_move = Move::invalid();

        for m in node.valid_moves() {
            let child = node.child(m);
            let v = -self.perfect_rec(&child, -beta, -alpha, &mut hash);
            if v > alpha {
                alpha = v;
                perfect_move = m;
            }
        }
        SearchResult {
            best_move: perfect_move,
            score: alpha,
        }
    }

    fn perfect_rec<G: Game>(
        &mut self,
        node: &Board<G>,
        mut alpha: i32,
        beta: i32,
        hash: &mut [SolverTable<G>],
    ) -> i32 {
        if let Some(&v) = hash[0].get(node.key()) {
            return if node.is_violet_turn() { v } else { -v };
        }

        self.visited_nodes += 1;

        for m in node.valid_moves() {
            let child = node.child(m);
            if child.is_game_over() {
                debug_assert!(m.is_pass());
                return node.relative_score();
            }
            let v = -self.perfect_rec(&child, -beta, -alpha, &mut hash[1..]);
            if v > alpha {
                alpha = v;
                if alpha >= beta {
                    hash[0].insert(
                        *node.key(),
                        if node.is_violet_turn() { beta } else { -beta },
                    );
                    return beta;
                }
            }
        }
        hash[0].insert(
            *node.key(),
            if node.is_violet_turn() { alpha } else { -alpha },
        );
        alpha
    }

    /// 定石の初手。手数0なら定石表から一様に引き、それ以外は
    /// 無効手を返して「定石なし」を伝える。
    pub fn opening_move<G: Game>(&mut self, b: &Board<G>) -> Move {
        let book = G::opening_book();
        if b.turn() == 0 && !book.is_empty() {
            book[self.rng.gen_range(0..book.len())]
        } else {
            Move::invalid()
        }
    }
}

impl Default for Searcher {
    fn default() -> Searcher {
        Searcher::new()
    }
}

// ソルバ用の深さ別テーブル。ゲーム終了までの残り手数ぶん確保する
// (最大手数 = 2×ピース数 + パス2回)。パスの連鎖が終局を1〜2手
// またぐので少し余裕を持たせる。
fn solver_tables<G: Game>(turn: i32) -> Vec<SolverTable<G>> {
    let max_turn = 2 * G::NUM_PIECES as i32 + 2;
    vec![SolverTable::<G>::default(); (max_turn - turn).max(4) as usize]
}
