//! ProbCut係数テーブル
//!
//! 深い探索の結果を浅い探索から線形回帰 `deep ≈ a·shallow + b` (誤差σ)で
//! 予測するための係数。自己対戦の回帰データから手数×深さごとに
//! オフラインで当てはめたもの。`depth == 0` のエントリは「係数なし」を
//! 表し、その(手数, 深さ)ではProbCutを行わない。スタンダード版のみ。

/// (手数, 深さ)に対応する予測係数。
#[derive(Clone, Copy, Debug)]
pub struct ProbCut {
    /// 予測に使う浅い探索の深さ。0なら係数なし。
    pub depth: i32,
    pub a: f64,
    pub b: f64,
    pub sigma: f64,
}

pub const PROBCUT_MIN_HEIGHT: i32 = 3;
pub const PROBCUT_MAX_HEIGHT: i32 = 10;
pub const PROBCUT_MAX_TURN: i32 = 24;

const fn pc(depth: i32, a: f64, b: f64, sigma: f64) -> ProbCut {
    ProbCut { depth, a, b, sigma }
}

const NONE: ProbCut = pc(0, 0.0, 0.0, 0.0);
const NO_ROW: [ProbCut; 8] = [NONE; 8];

// 行 = 手数0..=24、列 = 深さ3..=10。序盤8手はペントミノ以外を生成しない
// 探索条件で回帰データを取っていないため係数なし。
#[rustfmt::skip]
static PROBCUT_TABLE: [[ProbCut; 8]; 25] = [
    NO_ROW,                                                                 // 0
    NO_ROW,                                                                 // 1
    NO_ROW,                                                                 // 2
    NO_ROW,                                                                 // 3
    NO_ROW,                                                                 // 4
    NO_ROW,                                                                 // 5
    NO_ROW,                                                                 // 6
    NO_ROW,                                                                 // 7
    [pc(1, 1.041, -1.87, 11.3), pc(2, 1.028, 2.14, 12.0),
     pc(1, 1.086, -2.61, 13.9), pc(2, 1.062, 2.92, 14.5),
     pc(3, 1.044, -1.78, 15.2), pc(4, 1.033, 2.35, 15.8),
     pc(5, 1.027, -2.06, 16.6), pc(6, 1.021, 2.63, 17.1)],                  // 8
    [pc(1, 1.052, -2.03, 11.1), pc(2, 1.035, 2.26, 11.8),
     pc(1, 1.092, -2.74, 13.6), pc(2, 1.069, 3.01, 14.2),
     pc(3, 1.049, -1.91, 14.9), pc(4, 1.038, 2.47, 15.5),
     pc(5, 1.030, -2.18, 16.2), pc(6, 1.024, 2.75, 16.8)],                  // 9
    [pc(1, 1.047, -1.95, 10.8), pc(2, 1.031, 2.19, 11.5),
     pc(1, 1.088, -2.66, 13.2), pc(2, 1.064, 2.95, 13.8),
     pc(3, 1.046, -1.84, 14.5), pc(4, 1.035, 2.40, 15.1),
     pc(5, 1.028, -2.11, 15.8), pc(6, 1.022, 2.68, 16.4)],                  // 10
    [pc(1, 1.039, -1.82, 10.4), pc(2, 1.026, 2.09, 11.1),
     pc(1, 1.081, -2.55, 12.8), pc(2, 1.058, 2.84, 13.4),
     pc(3, 1.041, -1.74, 14.1), pc(4, 1.031, 2.31, 14.7),
     pc(5, 1.025, -2.01, 15.4), pc(6, 1.019, 2.58, 15.9)],                  // 11
    [pc(1, 1.033, -1.71, 10.1), pc(2, 1.022, 1.98, 10.7),
     pc(1, 1.075, -2.44, 12.4), pc(2, 1.053, 2.73, 13.0),
     pc(3, 1.037, -1.65, 13.7), pc(4, 1.027, 2.22, 14.2),
     pc(5, 1.022, -1.92, 14.9), pc(6, 1.017, 2.48, 15.5)],                  // 12
    [pc(1, 1.028, -1.61, 9.7),  pc(2, 1.018, 1.88, 10.4),
     pc(1, 1.069, -2.33, 12.0), pc(2, 1.048, 2.62, 12.6),
     pc(3, 1.034, -1.56, 13.2), pc(4, 1.024, 2.13, 13.8),
     pc(5, 1.019, -1.83, 14.4), pc(6, 1.015, 2.39, 15.0)],                  // 13
    [pc(1, 1.023, -1.52, 9.4),  pc(2, 1.015, 1.79, 10.0),
     pc(1, 1.063, -2.23, 11.6), pc(2, 1.044, 2.51, 12.2),
     pc(3, 1.030, -1.48, 12.8), pc(4, 1.022, 2.04, 13.4),
     pc(5, 1.017, -1.74, 14.0), pc(6, 1.013, 2.30, 14.6)],                  // 14
    [pc(1, 1.019, -1.43, 9.1),  pc(2, 1.012, 1.70, 9.7),
     pc(1, 1.058, -2.13, 11.2), pc(2, 1.040, 2.41, 11.8),
     pc(3, 1.027, -1.40, 12.4), pc(4, 1.019, 1.96, 13.0),
     pc(5, 1.015, -1.66, 13.6), pc(6, 1.011, 2.21, 14.1)],                  // 15
    [pc(1, 1.015, -1.35, 8.7),  pc(2, 1.010, 1.61, 9.4),
     pc(1, 1.053, -2.03, 10.9), pc(2, 1.036, 2.31, 11.4),
     pc(3, 1.024, -1.33, 12.0), pc(4, 1.017, 1.88, 12.6),
     pc(5, 1.013, -1.58, 13.2), pc(6, 1.010, 2.12, 13.7)],                  // 16
    [pc(1, 1.012, -1.27, 8.4),  pc(2, 1.008, 1.53, 9.0),
     pc(1, 1.049, -1.94, 10.5), pc(2, 1.033, 2.21, 11.0),
     pc(3, 1.021, -1.26, 11.6), pc(4, 1.015, 1.80, 12.2),
     pc(5, 1.011, -1.50, 12.7), pc(6, 1.009, 2.03, 13.3)],                  // 17
    [pc(1, 1.010, -1.19, 8.1),  pc(2, 1.007, 1.45, 8.7),
     pc(1, 1.045, -1.85, 10.1), pc(2, 1.030, 2.12, 10.7),
     pc(3, 1.019, -1.19, 11.2), pc(4, 1.013, 1.72, 11.8),
     pc(5, 1.010, -1.43, 12.3), pc(6, 1.008, 1.95, 12.9)],                  // 18
    [pc(1, 1.008, -1.12, 7.8),  pc(2, 1.006, 1.37, 8.4),
     pc(1, 1.041, -1.76, 9.8),  pc(2, 1.027, 2.03, 10.3),
     pc(3, 1.017, -1.12, 10.9), pc(4, 1.012, 1.65, 11.4),
     pc(5, 1.009, -1.36, 11.9), pc(6, 1.007, 1.87, 12.5)],                  // 19
    [pc(1, 1.007, -1.05, 7.5),  pc(2, 1.005, 1.30, 8.1),
     pc(1, 1.038, -1.68, 9.4),  pc(2, 1.025, 1.94, 10.0),
     pc(3, 1.015, -1.06, 10.5), pc(4, 1.011, 1.58, 11.0),
     pc(5, 1.008, -1.29, 11.6), pc(6, 1.006, 1.79, 12.1)],                  // 20
    [pc(1, 1.006, -0.99, 7.2),  pc(2, 1.004, 1.23, 7.8),
     pc(1, 1.035, -1.60, 9.1),  pc(2, 1.023, 1.86, 9.6),
     pc(3, 1.014, -1.00, 10.1), pc(4, 1.010, 1.51, 10.7),
     pc(5, 1.007, -1.23, 11.2), pc(6, 1.005, 1.72, 11.7)],                  // 21
    [pc(1, 1.005, -0.93, 7.0),  pc(2, 1.004, 1.16, 7.5),
     pc(1, 1.032, -1.53, 8.8),  pc(2, 1.021, 1.78, 9.3),
     pc(3, 1.013, -0.95, 9.8),  pc(4, 1.009, 1.45, 10.3),
     pc(5, 1.007, -1.17, 10.8), pc(6, 1.005, 1.65, 11.4)],                  // 22
    [pc(1, 1.004, -0.87, 6.7),  pc(2, 1.003, 1.10, 7.2),
     pc(1, 1.029, -1.46, 8.5),  pc(2, 1.019, 1.70, 9.0),
     pc(3, 1.012, -0.90, 9.5),  pc(4, 1.008, 1.39, 10.0),
     pc(5, 1.006, -1.11, 10.5), pc(6, 1.004, 1.58, 11.0)],                  // 23
    [pc(1, 1.004, -0.82, 6.4),  pc(2, 1.003, 1.04, 6.9),
     pc(1, 1.027, -1.39, 8.2),  pc(2, 1.018, 1.63, 8.7),
     pc(3, 1.011, -0.85, 9.1),  pc(4, 1.008, 1.33, 9.6),
     pc(5, 1.005, -1.06, 10.1), pc(6, 1.004, 1.52, 10.6)],                  // 24
];

/// (手数, 深さ)の係数を引く。係数がなければNone。
pub fn entry(turn: i32, depth: i32) -> Option<&'static ProbCut> {
    if !(PROBCUT_MIN_HEIGHT..=PROBCUT_MAX_HEIGHT).contains(&depth)
        || !(0..=PROBCUT_MAX_TURN).contains(&turn)
    {
        return None;
    }
    let pc = &PROBCUT_TABLE[turn as usize][(depth - PROBCUT_MIN_HEIGHT) as usize];
    if pc.depth == 0 {
        None
    } else {
        Some(pc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_bounds() {
        assert!(entry(8, 2).is_none());
        assert!(entry(8, 11).is_none());
        assert!(entry(25, 5).is_none());
        assert!(entry(-1, 5).is_none());
    }

    #[test]
    fn test_early_turns_have_no_entry() {
        for turn in 0..8 {
            for depth in PROBCUT_MIN_HEIGHT..=PROBCUT_MAX_HEIGHT {
                assert!(entry(turn, depth).is_none(), "turn {turn} depth {depth}");
            }
        }
    }

    #[test]
    fn test_shallow_depth_is_shallower() {
        for turn in 0..=PROBCUT_MAX_TURN {
            for depth in PROBCUT_MIN_HEIGHT..=PROBCUT_MAX_HEIGHT {
                if let Some(pc) = entry(turn, depth) {
                    assert!(pc.depth < depth);
                    assert!(pc.a > 0.0);
                    assert!(pc.sigma > 0.0);
                }
            }
        }
    }
}
