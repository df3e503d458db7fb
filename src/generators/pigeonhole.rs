use super::Instance;
use crate::sat::error::SolverError;

/// PHP(n): `n + 1` pigeons into `n` holes, unsatisfiable for every `n >= 1`.
///
/// Variable `p·n + h + 1` means pigeon `p` sits in hole `h`. Every pigeon gets
/// an at-least-one-hole clause, and every hole a pairwise at-most-one clause
/// per pigeon pair.
///
/// # Errors
///
/// `InvalidGenerator` for `n = 0`, which has no holes and no encoding.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn pigeonhole(n: usize) -> Result<Instance, SolverError> {
    if n == 0 {
        return Err(SolverError::InvalidGenerator(
            "pigeonhole needs at least one hole".to_string(),
        ));
    }

    let var = |p: usize, h: usize| (p * n + h + 1) as i32;
    let pigeons = n + 1;

    let mut clauses: Vec<Vec<i32>> = (0..pigeons)
        .map(|p| (0..n).map(|h| var(p, h)).collect())
        .collect();

    for h in 0..n {
        for p1 in 0..pigeons {
            for p2 in p1 + 1..pigeons {
                clauses.push(vec![-var(p1, h), -var(p2, h)]);
            }
        }
    }

    Ok(Instance {
        name: format!("php-{n}"),
        num_vars: n * pigeons,
        clauses,
    })
}
