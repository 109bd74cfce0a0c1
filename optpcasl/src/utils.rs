/// Returns the binomial coefficient `n` choose `k`, saturating at `u128::MAX`.
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut c: u128 = 1;
    for i in 0..k {
        // c * (n - i) / (i + 1) stays integral at every step
        c = match c.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    c
}

/// Lexicographically ordered `k`-combinations of the indices `0..n`.
pub struct Combinations {
    n: usize,
    ids: Option<Vec<usize>>,
}

impl Combinations {
    /// Creates the iterator, which is empty if `k > n`.
    pub fn new(n: usize, k: usize) -> Self {
        let ids = (k <= n).then(|| (0..k).collect());
        Self { n, ids }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.ids.take()?;
        let k = current.len();
        let mut next = current.clone();
        // rightmost index that can still be increased
        let pos = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        if let Some(i) = pos {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            self.ids = Some(next);
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    #[test]
    fn binomial_coefficients() -> Result<()> {
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(30, 6), 593_775);
        assert_eq!(binomial(4, 0), 1);
        assert_eq!(binomial(4, 4), 1);
        assert_eq!(binomial(2, 3), 0);
        assert_eq!(binomial(117, 6), 3_127_595_016);
        Ok(())
    }

    #[test]
    fn combinations_order() -> Result<()> {
        let combs: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            combs,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 3).collect::<Vec<_>>(), vec![vec![0, 1, 2]]);
        assert_eq!(Combinations::new(2, 3).count(), 0);
        assert_eq!(Combinations::new(3, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
        Ok(())
    }

    #[test]
    fn combinations_count() -> Result<()> {
        for n in 0..9 {
            for k in 0..=n {
                assert_eq!(Combinations::new(n, k).count() as u128, binomial(n, k));
            }
        }
        Ok(())
    }
}
