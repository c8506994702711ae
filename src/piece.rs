//! ピース形状テーブル
//!
//! 21種類のブロック(ポリオミノ)と、その回転・鏡像から得られる91通りの
//! 向き固定ピースを起動時に一度だけ構築する。スタンダード版は全91ピース、
//! ミニ版はテトロミノ以下の28ピースを使う。

use std::sync::LazyLock;

/// 二面体群の向きの数(回転4 × 鏡像2)。
pub const NUM_ORIENTATIONS: usize = 8;

/// 向きを固定したピース。
///
/// `id = block_id << 3 | orientation`。対称形のブロックでは一部の向きしか
/// 実体化されず、残りは[`Block::rotations`]で正規形へ写される。
#[derive(Clone, Debug)]
pub struct Piece {
    pub id: u8,
    pub size: u8,
    /// 原点からの各セルの相対座標。
    pub coords: Vec<(i8, i8)>,
    /// 象限(NW, NE, SW, SE)ごとの露出コーナーセル。
    pub corners: [Vec<(i8, i8)>; 4],
    pub minx: i8,
    pub miny: i8,
    pub maxx: i8,
    pub maxy: i8,
}

impl Piece {
    #[inline]
    pub fn block_id(&self) -> usize {
        (self.id >> 3) as usize
    }

    #[inline]
    pub fn orientation(&self) -> u8 {
        self.id & 7
    }

    /// ブロックを表す小文字('a'..='u')。
    #[inline]
    pub fn letter(&self) -> char {
        (b'a' + (self.id >> 3)) as char
    }
}

/// 任意の向きを正規形ピースへ写す変換。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rotation {
    pub offset_x: i8,
    pub offset_y: i8,
    /// 正規形ピースのid。
    pub piece: u8,
}

/// ブロック(形状ファミリ)。
#[derive(Clone, Debug)]
pub struct Block {
    pub name: char,
    pub size: u8,
    /// 実体化されたピースのid(向き昇順)。
    pub variants: Vec<u8>,
    /// 8方向それぞれを正規形へ写すテーブル。
    pub rotations: [Rotation; NUM_ORIENTATIONS],
}

// 向き0の基準形状。インデックスがblock_id、名前は 'a' + block_id。
#[rustfmt::skip]
const BASE_SHAPES: [&[(i8, i8)]; 21] = [
    &[(0, 0)],                                          // a: I1
    &[(0, 0), (0, 1)],                                  // b: I2
    &[(0, 0), (0, 1), (0, -1)],                         // c: I3
    &[(0, 0), (1, 0), (0, -1)],                         // d: L3
    &[(0, 0), (0, 1), (0, 2), (0, -1)],                 // e: I4
    &[(0, 0), (0, -1), (0, 1), (-1, 1)],                // f: L4
    &[(0, 0), (1, 0), (0, 1), (0, -1)],                 // g: T4
    &[(0, 0), (1, 0), (0, 1), (1, 1)],                  // h: O4
    &[(-1, 0), (0, 0), (0, 1), (1, 1)],                 // i: Z4
    &[(0, 0), (0, 1), (0, 2), (0, -1), (0, -2)],        // j: I5
    &[(0, 0), (0, 1), (0, -2), (0, -1), (-1, 1)],       // k: L5
    &[(0, -2), (0, -1), (0, 0), (-1, 0), (-1, 1)],      // l: N5
    &[(0, -1), (-1, 0), (0, 0), (-1, 1), (0, 1)],       // m: P5
    &[(0, 0), (0, 1), (-1, 1), (0, -1), (-1, -1)],      // n: C5
    &[(0, -1), (0, 0), (1, 0), (0, 1), (0, 2)],         // o: Y5
    &[(0, 0), (0, -1), (0, 1), (-1, 1), (1, 1)],        // p: T5
    &[(0, 0), (1, 0), (2, 0), (0, -1), (0, -2)],        // q: V5
    &[(0, 0), (1, 0), (1, 1), (0, -1), (-1, -1)],       // r: W5
    &[(0, 0), (1, 0), (1, 1), (-1, 0), (-1, -1)],       // s: Z5
    &[(-1, -1), (-1, 0), (0, 0), (1, 0), (0, 1)],       // t: F5
    &[(0, 0), (1, 0), (0, 1), (-1, 0), (0, -1)],        // u: X5
];

struct PieceTable {
    blocks: Vec<Block>,
    pieces: Vec<Piece>,
    // id -> pieces内インデックス。未実体化はu8::MAX。
    by_id: [u8; 168],
}

static TABLE: LazyLock<PieceTable> = LazyLock::new(build_table);

// ピース列挙の走査順。大きいブロックが先に来るよう逆順に並べる。
static STANDARD_SET: LazyLock<Vec<&'static Piece>> = LazyLock::new(|| {
    TABLE
        .blocks
        .iter()
        .rev()
        .flat_map(|b| b.variants.iter().map(|&id| piece(id)))
        .collect()
});

static MINI_SET: LazyLock<Vec<&'static Piece>> = LazyLock::new(|| {
    STANDARD_SET
        .iter()
        .copied()
        .filter(|p| p.size <= 4)
        .collect()
});

/// ブロックテーブルを引く。`block_id < 21` であること。
#[inline]
pub fn block(block_id: usize) -> &'static Block {
    &TABLE.blocks[block_id]
}

/// 実体化済みピースをidで引く。idは正規形のものに限る。
#[inline]
pub fn piece(id: u8) -> &'static Piece {
    &TABLE.pieces[TABLE.by_id[id as usize] as usize]
}

/// スタンダード版の全91ピース。
pub fn standard_piece_set() -> &'static [&'static Piece] {
    &STANDARD_SET
}

/// ミニ版の全28ピース(テトロミノ以下)。
pub fn mini_piece_set() -> &'static [&'static Piece] {
    &MINI_SET
}

fn build_table() -> PieceTable {
    let mut blocks = Vec::with_capacity(BASE_SHAPES.len());
    let mut pieces: Vec<Piece> = Vec::new();
    let mut by_id = [u8::MAX; 168];

    for (block_id, base) in BASE_SHAPES.iter().enumerate() {
        let mut coords: Vec<(i8, i8)> = base.to_vec();
        let mut variants = Vec::new();
        let mut rotations = [Rotation {
            offset_x: 0,
            offset_y: 0,
            piece: 0,
        }; NUM_ORIENTATIONS];
        let first = pieces.len();

        for orientation in 0..NUM_ORIENTATIONS {
            if let Some(rot) = find_synonym(&pieces[first..], &coords) {
                rotations[orientation] = rot;
            } else {
                let id = (block_id << 3 | orientation) as u8;
                rotations[orientation] = Rotation {
                    offset_x: 0,
                    offset_y: 0,
                    piece: id,
                };
                by_id[id as usize] = pieces.len() as u8;
                variants.push(id);
                pieces.push(make_piece(id, &coords));
            }
            // 次の向きへ: 鏡像をとり、奇数番の後はさらに右回転。
            for c in coords.iter_mut() {
                *c = (-c.0, c.1);
            }
            if orientation % 2 == 1 {
                for c in coords.iter_mut() {
                    *c = (-c.1, c.0);
                }
            }
        }

        blocks.push(Block {
            name: (b'a' + block_id as u8) as char,
            size: base.len() as u8,
            variants,
            rotations,
        });
    }

    PieceTable {
        blocks,
        pieces,
        by_id,
    }
}

// 平行移動で一致する既出ピースを探す。見つかればその正規形への変換を返す。
fn find_synonym(block_pieces: &[Piece], coords: &[(i8, i8)]) -> Option<Rotation> {
    let mut sorted: Vec<(i8, i8)> = coords.to_vec();
    sorted.sort_unstable();
    let minx = coords.iter().map(|c| c.0).min().unwrap_or(0);
    let miny = coords.iter().map(|c| c.1).min().unwrap_or(0);

    for p in block_pieces {
        let mut p_sorted = p.coords.clone();
        p_sorted.sort_unstable();
        let same = p_sorted
            .iter()
            .zip(&sorted)
            .all(|(a, b)| a.0 - p.minx == b.0 - minx && a.1 - p.miny == b.1 - miny);
        if same {
            return Some(Rotation {
                offset_x: minx - p.minx,
                offset_y: miny - p.miny,
                piece: p.id,
            });
        }
    }
    None
}

fn make_piece(id: u8, coords: &[(i8, i8)]) -> Piece {
    let contains = |x: i8, y: i8| coords.contains(&(x, y));

    // コーナー = 左右両隣も上下両隣も埋まっていないセル。
    let corner_cells: Vec<(i8, i8)> = coords
        .iter()
        .copied()
        .filter(|&(x, y)| {
            !(contains(x - 1, y) && contains(x + 1, y))
                && !(contains(x, y - 1) && contains(x, y + 1))
        })
        .collect();

    let directed = |no_vert: bool, no_horiz: bool| -> Vec<(i8, i8)> {
        corner_cells
            .iter()
            .copied()
            .filter(|&(x, y)| {
                let dy = if no_vert { y - 1 } else { y + 1 };
                let dx = if no_horiz { x - 1 } else { x + 1 };
                !contains(x, dy) && !contains(dx, y)
            })
            .collect()
    };

    Piece {
        id,
        size: coords.len() as u8,
        coords: coords.to_vec(),
        corners: [
            directed(true, true),   // NW: 上にも左にもセルがない
            directed(true, false),  // NE
            directed(false, true),  // SW
            directed(false, false), // SE
        ],
        minx: coords.iter().map(|c| c.0).min().unwrap_or(0),
        miny: coords.iter().map(|c| c.1).min().unwrap_or(0),
        maxx: coords.iter().map(|c| c.0).max().unwrap_or(0),
        maxy: coords.iter().map(|c| c.1).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_set_sizes() {
        assert_eq!(91, standard_piece_set().len());
        assert_eq!(28, mini_piece_set().len());
    }

    #[test]
    fn test_variant_counts_per_block() {
        let expected = [1, 2, 2, 4, 2, 8, 4, 1, 4, 2, 8, 8, 8, 4, 8, 4, 4, 4, 4, 8, 1];
        for (block_id, &n) in expected.iter().enumerate() {
            assert_eq!(
                n,
                block(block_id).variants.len(),
                "block {}",
                (b'a' + block_id as u8) as char
            );
        }
    }

    #[test]
    fn test_large_pieces_first() {
        // 走査順はブロック逆順。先頭はX5、末尾はI1。
        assert_eq!('u', standard_piece_set()[0].letter());
        assert_eq!('a', standard_piece_set()[90].letter());
        assert_eq!('i', mini_piece_set()[0].letter());
    }

    #[test]
    fn test_domino_rotations() {
        // I2の向き6は横向き。正規形は向き2、オフセット(1, 0)。
        let b = block(1);
        assert_eq!(
            Rotation {
                offset_x: 1,
                offset_y: 0,
                piece: 1 << 3 | 2,
            },
            b.rotations[6]
        );
        // 向き4は縦向きのまま1つ上にずれる。
        assert_eq!(
            Rotation {
                offset_x: 0,
                offset_y: -1,
                piece: 1 << 3 | 0,
            },
            b.rotations[4]
        );
    }

    #[test]
    fn test_monomino_is_fully_symmetric() {
        let a = block(0);
        for rot in &a.rotations {
            assert_eq!(0, rot.piece);
            assert_eq!((0, 0), (rot.offset_x, rot.offset_y));
        }
        assert_eq!(1, a.variants.len());
    }

    #[test]
    fn test_x_pentomino_corners() {
        // X5の腕4セルはそれぞれ2象限に露出する。
        let u = piece(20 << 3);
        assert_eq!(5, u.size);
        for q in 0..4 {
            assert_eq!(2, u.corners[q].len(), "quadrant {q}");
        }
        assert!(u.corners[0].contains(&(-1, 0)));
        assert!(u.corners[0].contains(&(0, -1)));
    }

    #[test]
    fn test_corner_count_bound() {
        // 生成される象限あたりのコーナーは最大3(探索の作業領域の前提)。
        for p in standard_piece_set() {
            for q in 0..4 {
                assert!(p.corners[q].len() <= 3, "piece {:#x}", p.id);
            }
        }
    }

    #[test]
    fn test_rotation_targets_are_materialized() {
        for block_id in 0..BASE_SHAPES.len() {
            let blk = block(block_id);
            for rot in &blk.rotations {
                assert_eq!(block_id, piece(rot.piece).block_id());
            }
        }
    }

    #[test]
    fn test_bounding_boxes() {
        for p in standard_piece_set() {
            for &(x, y) in &p.coords {
                assert!(p.minx <= x && x <= p.maxx);
                assert!(p.miny <= y && y <= p.maxy);
            }
        }
    }
}
