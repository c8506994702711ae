//! 自己対戦ドライバ
//!
//! スタンダード盤で終局まで自己対戦し、1手ごとの探索ノード数と
//! 所要時間、最後に両者の得点を表示する。

use std::time::Instant;

use duomind::board::{Board, Game, Standard};
use duomind::moves::Move;
use duomind::search::Searcher;

fn search_move<G: Game>(searcher: &mut Searcher, b: &Board<G>) -> Move {
    let timeout = 10_000;
    let max_depth = match b.turn() {
        t if t < 10 => 3,
        t if t < 16 => 4,
        t if t < 20 => 5,
        _ => 6,
    };

    let m = searcher.opening_move(b);
    if m.is_valid() {
        return m;
    }

    let r = if b.turn() < 21 {
        searcher.negascout(b, max_depth, timeout / 2, timeout)
    } else if b.turn() < 25 {
        searcher.wld(b, 1_000)
    } else {
        searcher.perfect(b)
    };
    r.best_move
}

fn main() {
    let mut searcher = Searcher::new();
    let mut b = Board::<Standard>::new();

    while !b.is_game_over() {
        let start = Instant::now();
        searcher.reset_visited_nodes();

        let m = search_move(&mut searcher, &b);
        b.play_move(m);

        let sec = start.elapsed().as_secs_f64();
        let nodes = searcher.visited_nodes();
        println!(
            "{} {} {} nodes / {:.3} sec ({} nps)",
            b.turn(),
            m.code(),
            nodes,
            sec,
            (nodes as f64 / sec.max(1e-9)) as u64
        );
    }
    println!("Final score: {} - {}", b.score(0), b.score(1));
}
