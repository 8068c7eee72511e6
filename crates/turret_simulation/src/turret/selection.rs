//! Политика выбора следующего ствола
//!
//! Выбирается один раз при spawn турели и дальше не меняется.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Как перебирать стволы в alignment режиме
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum BarrelSelection {
    /// 0, 1, 2, ..., n-1, 0, ...
    Sequential,

    /// Случайный индекс; при совпадении с текущим: следующий по кругу.
    ///
    /// Не повторяет текущий ствол, но индекс `current + 1` выпадает
    /// вдвое чаще остальных (при n > 2).
    #[default]
    RandomBumpOnRepeat,

    /// Равномерно среди n-1 стволов, отличных от текущего
    RandomUniform,
}

impl BarrelSelection {
    /// Следующий индекс ствола
    ///
    /// `current = None`: индекс ещё не выбирался (старт).
    /// Результат всегда в `[0, barrel_count)`; при `barrel_count <= 1` это 0.
    pub fn next_index<R: Rng + ?Sized>(
        &self,
        current: Option<usize>,
        barrel_count: usize,
        rng: &mut R,
    ) -> usize {
        if barrel_count <= 1 {
            return 0;
        }

        // Индекс за пределами массива трактуем как "не выбран"
        let current = current.filter(|&index| index < barrel_count);

        match self {
            BarrelSelection::Sequential => match current {
                Some(index) => (index + 1) % barrel_count,
                None => 0,
            },
            BarrelSelection::RandomBumpOnRepeat => {
                let candidate = rng.gen_range(0..barrel_count);
                if Some(candidate) == current {
                    (candidate + 1) % barrel_count
                } else {
                    candidate
                }
            }
            BarrelSelection::RandomUniform => match current {
                Some(index) => {
                    let candidate = rng.gen_range(0..barrel_count - 1);
                    if candidate >= index {
                        candidate + 1
                    } else {
                        candidate
                    }
                }
                None => rng.gen_range(0..barrel_count),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_sequential_cycle_from_uninitialized() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let policy = BarrelSelection::Sequential;

        let first = policy.next_index(None, 3, &mut rng);
        let second = policy.next_index(Some(first), 3, &mut rng);
        let third = policy.next_index(Some(second), 3, &mut rng);
        let fourth = policy.next_index(Some(third), 3, &mut rng);

        assert_eq!([first, second, third, fourth], [0, 1, 2, 0]);
    }

    #[test]
    fn test_sequential_visits_every_index_once_per_cycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let policy = BarrelSelection::Sequential;

        for count in 1..8 {
            let mut current = None;
            let mut visited = Vec::new();
            for _ in 0..count {
                let next = policy.next_index(current, count, &mut rng);
                visited.push(next);
                current = Some(next);
            }
            assert_eq!(visited, (0..count).collect::<Vec<_>>());
            assert_eq!(policy.next_index(current, count, &mut rng), 0);
        }
    }

    #[test]
    fn test_random_policies_never_repeat() {
        for policy in [BarrelSelection::RandomBumpOnRepeat, BarrelSelection::RandomUniform] {
            for count in 2..6 {
                let mut rng = ChaCha8Rng::seed_from_u64(count as u64);
                let mut current = policy.next_index(None, count, &mut rng);
                for _ in 0..500 {
                    let next = policy.next_index(Some(current), count, &mut rng);
                    assert_ne!(next, current, "{:?} repeated with {} barrels", policy, count);
                    assert!(next < count);
                    current = next;
                }
            }
        }
    }

    #[test]
    fn test_single_barrel_always_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for policy in [
            BarrelSelection::Sequential,
            BarrelSelection::RandomBumpOnRepeat,
            BarrelSelection::RandomUniform,
        ] {
            assert_eq!(policy.next_index(None, 1, &mut rng), 0);
            assert_eq!(policy.next_index(Some(0), 1, &mut rng), 0);
        }
    }

    #[test]
    fn test_bump_policy_favours_next_index() {
        // 4 ствола, текущий 0: индекс 1 получает 2/4, индексы 2 и 3: по 1/4
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut hits = [0usize; 4];
        for _ in 0..8000 {
            hits[BarrelSelection::RandomBumpOnRepeat.next_index(Some(0), 4, &mut rng)] += 1;
        }
        assert_eq!(hits[0], 0);
        assert!(hits[1] > hits[2] + 1000, "hits = {:?}", hits);
        assert!(hits[1] > hits[3] + 1000, "hits = {:?}", hits);
    }

    #[test]
    fn test_uniform_policy_is_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut hits = [0usize; 4];
        for _ in 0..9000 {
            hits[BarrelSelection::RandomUniform.next_index(Some(0), 4, &mut rng)] += 1;
        }
        assert_eq!(hits[0], 0);
        // ожидаем ~3000 на каждый
        for &count in &hits[1..] {
            assert!((2500..3500).contains(&count), "hits = {:?}", hits);
        }
    }

    #[test]
    fn test_out_of_range_current_treated_as_uninitialized() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(BarrelSelection::Sequential.next_index(Some(10), 3, &mut rng), 0);
    }
}
