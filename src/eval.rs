//! 局面評価
//!
//! 評価値 = 残りピースの重み差 + 勢力圏(角から3歩で届く空きマス)の差。
//! どちらも紫が優勢なら正。

use crate::board::{
    Board, Game, Mini, Standard, ORANGE_CORNER, ORANGE_MASK, ORANGE_TILE, VIOLET_CORNER,
    VIOLET_MASK, VIOLET_TILE,
};

// ブロックごとの重み。大きいピースを使い切った側が有利になる。
#[rustfmt::skip]
const PIECE_VALUE: [i32; 21] = [
    2,  4,  6,  6,  10, 10, 10, 10, 10, 16, 16,
    16, 16, 16, 16, 16, 16, 16, 16, 16, 16,
];

/// 未使用ピースの重み差。
pub(crate) fn eval_pieces<G: Game>(b: &Board<G>) -> i32 {
    let mut score = 0;
    for i in 0..G::NUM_PIECES {
        if b.is_piece_available(0, i) {
            score -= PIECE_VALUE[i];
        }
        if b.is_piece_available(1, i) {
            score += PIECE_VALUE[i];
        }
    }
    score
}

// 勢力圏: 自分の角マスを種に、置ける見込みのあるマス(自色のフラグも
// 相手タイルもないマス)を直交方向に3段広げ、届いたマス数を数える。

/// スタンダード盤の勢力差。番兵付きバイト盤で波状に広げる。
pub(crate) fn influence_standard(b: &Board<Standard>) -> i32 {
    const PITCH: usize = 15;
    const BLOCKED: u8 = VIOLET_TILE | ORANGE_TILE;

    let mut score = 0;
    for player in 0..2 {
        let (mask, corner) = if player == 0 {
            (VIOLET_MASK | ORANGE_TILE, VIOLET_CORNER)
        } else {
            (ORANGE_MASK | VIOLET_TILE, ORANGE_CORNER)
        };

        // 上端・右端・下端を番兵で塞ぐ。左端は前行の右端番兵が兼ねる。
        let mut grid = [0u8; 16 * PITCH];
        for x in 0..=14 {
            grid[x] = BLOCKED;
            grid[225 + x] = BLOCKED;
        }
        for y in 0..=14 {
            grid[y * PITCH + 14] = BLOCKED;
        }

        let mut count = 0;
        let mut frontier = Vec::with_capacity(64);
        for y in 0..14 {
            for x in 0..14 {
                let pos = (y + 1) * PITCH + x;
                grid[pos] = b.at(x as i32, y as i32) & mask;
                if grid[pos] == corner {
                    frontier.push(pos);
                    count += 1;
                }
            }
        }

        for _ in 0..3 {
            let mut next = Vec::with_capacity(frontier.len() * 3);
            for &pos in &frontier {
                for q in [pos - PITCH, pos - 1, pos + 1, pos + PITCH] {
                    if grid[q] == 0 {
                        grid[q] = 1;
                        next.push(q);
                        count += 1;
                    }
                }
            }
            frontier = next;
        }

        score += if player == 0 { count } else { -count };
    }
    score
}

// x=0列とx=7列のビット。シフトの折り返しを防ぐ。
const FILE_A: u64 = 0x0101_0101_0101_0101;
const FILE_H: u64 = 0x8080_8080_8080_8080;

/// ミニ盤の勢力差。8×8なのでu64ビットボードのシフトで同じ波を作る。
pub(crate) fn influence_mini(b: &Board<Mini>) -> i32 {
    let mut score = 0;
    for player in 0..2 {
        let (mask, corner) = if player == 0 {
            (VIOLET_MASK | ORANGE_TILE, VIOLET_CORNER)
        } else {
            (ORANGE_MASK | VIOLET_TILE, ORANGE_CORNER)
        };

        let mut occupied = 0u64;
        let mut seeds = 0u64;
        for y in 0..8 {
            for x in 0..8 {
                let v = b.at(x, y) & mask;
                if v != 0 {
                    let bit = 1u64 << (y * 8 + x);
                    occupied |= bit;
                    if v == corner {
                        seeds |= bit;
                    }
                }
            }
        }

        let mut count = seeds.count_ones() as i32;
        let mut frontier = seeds;
        for _ in 0..3 {
            let spread = (frontier << 1) & !FILE_A
                | (frontier >> 1) & !FILE_H
                | frontier << 8
                | frontier >> 8;
            let grown = spread & !occupied;
            occupied |= grown;
            count += grown.count_ones() as i32;
            frontier = grown;
        }

        score += if player == 0 { count } else { -count };
    }
    score
}
