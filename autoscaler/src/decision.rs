/// Tamaño deseado del pool, o None si no hay que mandar nada.
///
/// - backlog > threshold y bajando: la mitad (mínimo 1)
/// - backlog > threshold y no bajando: el doble
/// - backlog <= threshold: volver a 1 worker si había más
pub fn decide(pending: u64, decreasing: bool, n_workers: u32, threshold: u64) -> Option<u32> {
    if pending > threshold {
        if decreasing {
            Some((n_workers / 2).max(1))
        } else {
            Some(n_workers.saturating_mul(2).max(1))
        }
    } else if n_workers > 1 {
        Some(1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backlog_alto() {
        assert_eq!(decide(150, true, 4, 100), Some(2));
        assert_eq!(decide(150, false, 4, 100), Some(8));
        // nunca por debajo de 1
        assert_eq!(decide(150, true, 1, 100), Some(1));
        assert_eq!(decide(101, true, 5, 100), Some(2));
    }

    #[test]
    fn backlog_bajo() {
        assert_eq!(decide(10, false, 5, 100), Some(1));
        assert_eq!(decide(10, true, 1, 100), None);
        // justo en el umbral no es "alto"
        assert_eq!(decide(100, false, 3, 100), Some(1));
    }
}
