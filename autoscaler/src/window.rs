use std::collections::VecDeque;

use crate::error::{Result, ScaleError};

/// true si cada par consecutivo baja estrictamente. Un par 0 -> 0 no cuenta como subida.
/// Con menos de dos muestras no hay evidencia de crecimiento: true.
pub fn is_decreasing(samples: &[u64]) -> bool {
    samples
        .windows(2)
        .all(|w| (w[0] == 0 && w[1] == 0) || w[1] < w[0])
}

/// Ventana deslizante con las últimas K muestras de tareas pendientes.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    k: usize,
    samples: VecDeque<u64>,
    // muestra anterior, para el caso K == 1 donde la ventana sólo guarda la actual
    previous: Option<u64>,
}

impl SampleWindow {
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(ScaleError::InvalidConfig(
                "CONSECUTIVE_REDUCTION_THRESHOLD debe ser positivo".to_string(),
            ));
        }
        Ok(Self {
            k,
            samples: VecDeque::with_capacity(k + 1),
            previous: None,
        })
    }

    /// Agrega una muestra (descartando la más vieja si se pasa de K) y dice si la
    /// tendencia es decreciente.
    pub fn push(&mut self, pending: u64) -> bool {
        let prior = self.previous.replace(pending);

        self.samples.push_back(pending);
        while self.samples.len() > self.k {
            self.samples.pop_front();
        }

        if self.k == 1 {
            return prior.map_or(true, |p| pending < p);
        }
        is_decreasing(self.samples.make_contiguous())
    }

    pub fn samples(&self) -> Vec<u64> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(k: usize, samples: &[u64]) -> bool {
        let mut w = SampleWindow::new(k).unwrap();
        let mut last = true;
        for s in samples {
            last = w.push(*s);
        }
        last
    }

    #[test]
    fn tendencias_basicas() {
        assert!(feed(3, &[5, 3, 1]));
        assert!(!feed(3, &[5, 5, 1]));
        assert!(!feed(3, &[1, 3, 5]));
    }

    /// 0 -> 0 no rompe la tendencia.
    #[test]
    fn ceros_seguidos_no_son_subida() {
        assert!(feed(3, &[0, 0, 0]));
        assert!(feed(3, &[4, 0, 0]));
        assert!(!feed(3, &[0, 0, 2]));
    }

    #[test]
    fn pocas_muestras_cuenta_como_decreciente() {
        assert!(feed(3, &[]));
        assert!(feed(3, &[500]));
    }

    #[test]
    fn ventana_descarta_las_viejas() {
        let mut w = SampleWindow::new(3).unwrap();
        for s in [1, 9, 8, 7] {
            w.push(s);
        }
        assert_eq!(w.samples(), vec![9, 8, 7]);
        // el 1 ya salió de la ventana, así que baja estrictamente
        assert!(w.push(6));
    }

    #[test]
    fn k_uno_compara_contra_la_muestra_anterior() {
        let mut w = SampleWindow::new(1).unwrap();
        assert!(w.push(7));
        assert!(w.push(3));
        assert!(!w.push(3));
        assert!(!w.push(10));
        assert_eq!(w.samples(), vec![10]);
    }

    #[test]
    fn k_cero_es_invalido() {
        assert!(matches!(
            SampleWindow::new(0),
            Err(ScaleError::InvalidConfig(_))
        ));
    }
}
