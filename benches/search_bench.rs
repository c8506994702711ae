use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use duomind::board::{Board, Game, Standard};
use duomind::search::Searcher;

/// 固定シードの中盤局面。ProbCut係数とペントミノフィルタの外に出るよう
/// 8手進めておく。
fn midgame<G: Game>(plies: usize) -> Board<G> {
    let mut rng = StdRng::seed_from_u64(0xBEE);
    let mut b = Board::<G>::new();
    for _ in 0..plies {
        if b.is_game_over() {
            break;
        }
        let moves = b.valid_moves();
        b.play_move(moves[rng.gen_range(0..moves.len())]);
    }
    b
}

/// 中盤局面での反復深化探索
fn bench_negascout_midgame(c: &mut Criterion) {
    let board = midgame::<Standard>(8);

    let mut group = c.benchmark_group("negascout_midgame");
    group.sample_size(10);

    for depth in 2..=4 {
        group.bench_with_input(BenchmarkId::new("depth", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut searcher = Searcher::with_seed(1);
                let result =
                    searcher.negascout(black_box(&board), black_box(depth), 60_000, 60_000);
                black_box(result)
            });
        });
    }

    group.finish();
}

/// 静的評価のコスト
fn bench_evaluate(c: &mut Criterion) {
    let board = midgame::<Standard>(8);

    c.bench_function("evaluate_midgame", |b| {
        b.iter(|| black_box(black_box(&board).evaluate()))
    });
}

criterion_group!(benches, bench_negascout_midgame, bench_evaluate);
criterion_main!(benches);
