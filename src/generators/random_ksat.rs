use super::Instance;
use crate::sat::error::SolverError;
use fastrand::Rng;

/// Literals per clause when none is given.
pub const DEFAULT_K: usize = 3;

/// Uniform random k-SAT: every clause draws `k` distinct variables and an
/// independent fair sign for each. The same seed always yields the same
/// instance.
///
/// # Errors
///
/// `InvalidGenerator` if `k` is 0 or exceeds `num_vars`.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn random_ksat(
    num_vars: usize,
    num_clauses: usize,
    k: usize,
    seed: u64,
) -> Result<Instance, SolverError> {
    if k == 0 || k > num_vars {
        return Err(SolverError::InvalidGenerator(format!(
            "cannot draw {k} distinct variables out of {num_vars}"
        )));
    }

    let mut rng = Rng::with_seed(seed);
    let clauses = (0..num_clauses)
        .map(|_| {
            let mut clause: Vec<i32> = Vec::with_capacity(k);
            while clause.len() < k {
                let var = rng.u32(1..=num_vars as u32) as i32;
                if clause.iter().any(|l| l.abs() == var) {
                    continue;
                }
                clause.push(if rng.bool() { var } else { -var });
            }
            clause
        })
        .collect();

    Ok(Instance {
        name: format!("{k}sat-{num_vars}-{num_clauses}-{seed}"),
        num_vars,
        clauses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_distinct_variables() {
        let instance = random_ksat(12, 40, 3, 7).unwrap();
        assert_eq!(instance.num_clauses(), 40);
        for clause in &instance.clauses {
            assert_eq!(clause.len(), 3);
            let mut vars: Vec<u32> = clause.iter().map(|l| l.unsigned_abs()).collect();
            vars.sort_unstable();
            vars.dedup();
            assert_eq!(vars.len(), 3);
            assert!(vars.iter().all(|&v| (1..=12).contains(&v)));
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(
            random_ksat(9, 20, 3, 42).unwrap(),
            random_ksat(9, 20, 3, 42).unwrap()
        );
    }

    #[test]
    fn test_k_equal_to_vars() {
        let instance = random_ksat(2, 5, 2, 1).unwrap();
        assert!(instance.clauses.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            random_ksat(3, 5, 0, 1),
            Err(SolverError::InvalidGenerator(_))
        ));
        assert!(matches!(
            random_ksat(2, 5, 3, 1),
            Err(SolverError::InvalidGenerator(_))
        ));
    }
}
