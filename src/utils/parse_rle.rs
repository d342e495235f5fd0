use crate::{Cell, Grid, PatternError};

/// Places the RLE-encoded pattern `data` on a blank `rows x cols` grid with
/// its top-left corner at the origin.
pub fn parse_rle(data: &[u8], rows: usize, cols: usize) -> Result<Grid, PatternError> {
    let parse_next_number = |i: &mut usize| -> Result<usize, PatternError> {
        while *i < data.len() && !data[*i].is_ascii_digit() {
            *i += 1;
        }
        let start = *i;
        while *i < data.len() && data[*i].is_ascii_digit() {
            *i += 1;
        }
        std::str::from_utf8(&data[start..*i])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or(PatternError::BadNumber(start))
    };
    let skip_line = |i: &mut usize| {
        while *i < data.len() && data[*i] != b'\n' {
            *i += 1;
        }
        *i += 1;
    };

    let mut i = 0;
    // skipping comment lines
    while i < data.len() && data[i] == b'#' {
        skip_line(&mut i);
    }
    // next line must start with 'x'; parsing sizes
    if i >= data.len() || data[i] != b'x' {
        return Err(PatternError::MissingHeader);
    }
    let width = parse_next_number(&mut i)?;
    let height = parse_next_number(&mut i)?;
    if width > cols || height > rows {
        return Err(PatternError::TooLarge {
            width,
            height,
            rows,
            cols,
        });
    }
    let too_large = PatternError::TooLarge {
        width,
        height,
        rows,
        cols,
    };
    let mut grid = Grid::blank(rows, cols).map_err(|_| too_large.clone())?;
    skip_line(&mut i);

    // run-length encoded pattern data
    let (mut x, mut y, mut cnt) = (0, 0, 1);
    while i < data.len() {
        match data[i] {
            b'\n' | b'\r' | b' ' | b'\t' => i += 1,
            b'0'..=b'9' => cnt = parse_next_number(&mut i)?,
            b'o' => {
                let end = advance(x, cnt, width).ok_or_else(|| too_large.clone())?;
                if y >= height {
                    return Err(too_large);
                }
                for col in x..end {
                    grid.set(y as isize, col as isize, Cell::Alive);
                }
                (x, i, cnt) = (end, i + 1, 1);
            }
            b'b' => {
                let end = advance(x, cnt, width).ok_or_else(|| too_large.clone())?;
                (x, i, cnt) = (end, i + 1, 1);
            }
            b'$' => {
                let end = advance(y, cnt, height).ok_or_else(|| too_large.clone())?;
                (x, y, i, cnt) = (0, end, i + 1, 1);
            }
            b'!' => break,
            other => {
                return Err(PatternError::UnexpectedSymbol {
                    symbol: other as char,
                    offset: i,
                })
            }
        };
    }
    Ok(grid)
}

/// `pos + run`, if the run stays within `limit`.
fn advance(pos: usize, run: usize, limit: usize) -> Option<usize> {
    pos.checked_add(run).filter(|&end| end <= limit)
}
