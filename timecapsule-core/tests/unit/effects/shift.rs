use super::*;

fn ramp(w: u32, h: u32) -> Vec<u8> {
    (0..w * h).map(|i| i as u8).collect()
}

#[test]
fn zero_shift_is_identity() {
    let p = ramp(5, 4);
    assert_eq!(shift_plane(&p, 5, 4, ShiftVector::default()), p);
}

#[test]
fn positive_dx_moves_right_and_clamps_left_edge() {
    let p = vec![1, 2, 3, 4, 5];
    assert_eq!(
        shift_plane(&p, 5, 1, ShiftVector::new(2, 0)),
        vec![1, 1, 1, 2, 3]
    );
}

#[test]
fn negative_dx_moves_left_and_clamps_right_edge() {
    let p = vec![1, 2, 3, 4, 5];
    assert_eq!(
        shift_plane(&p, 5, 1, ShiftVector::new(-2, 0)),
        vec![3, 4, 5, 5, 5]
    );
}

#[test]
fn vertical_shift_replicates_edge_rows() {
    // rows: [0 1] [2 3] [4 5]
    let p = ramp(2, 3);
    assert_eq!(
        shift_plane(&p, 2, 3, ShiftVector::new(0, 1)),
        vec![0, 1, 0, 1, 2, 3]
    );
    assert_eq!(
        shift_plane(&p, 2, 3, ShiftVector::new(0, -1)),
        vec![2, 3, 4, 5, 4, 5]
    );
}

#[test]
fn shift_larger_than_plane_fills_with_edge() {
    let p = vec![7, 8, 9];
    assert_eq!(shift_plane(&p, 3, 1, ShiftVector::new(10, 0)), vec![7, 7, 7]);
    assert_eq!(shift_plane(&p, 3, 1, ShiftVector::new(-10, 0)), vec![9, 9, 9]);
}

#[test]
fn shift_there_and_back_is_exact_only_in_the_interior() {
    let (w, h, k) = (12u32, 3u32, 3i32);
    let p: Vec<u8> = (0..w * h).map(|i| (i * 7 % 251) as u8).collect();
    let there = shift_plane(&p, w, h, ShiftVector::new(k, 0));
    let back = shift_plane(&there, w, h, ShiftVector::new(-k, 0));

    for y in 0..h as usize {
        for x in 0..w as usize {
            let i = y * w as usize + x;
            if x < (w as i32 - k) as usize {
                assert_eq!(back[i], p[i], "interior ({x},{y})");
            }
        }
        // the trailing k columns all collapse to the last surviving column
        let last_kept = p[y * w as usize + (w as i32 - k - 1) as usize];
        for x in (w as i32 - k) as usize..w as usize {
            assert_eq!(back[y * w as usize + x], last_kept);
        }
    }
    assert_ne!(back, p);
}

#[test]
fn sample_shifted_matches_shift_plane() {
    let data: Vec<u8> = (0..4u32 * 3 * 3).map(|i| (i * 13 % 256) as u8).collect();
    let g = PixelGrid::from_raw(4, 3, data).unwrap();
    let s = ShiftVector::new(-1, 2);
    for ch in Channel::ALL {
        let plane = shift_plane(&g.channel_plane(ch), 4, 3, s);
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(sample_shifted(&g, ch, x, y, s), plane[(y * 4 + x) as usize]);
            }
        }
    }
}
