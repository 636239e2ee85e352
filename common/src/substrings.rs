/// Devuelve todas las subcadenas contiguas de `s`, ordenadas por posición de inicio
/// y luego por largo: "abc" -> a, ab, abc, b, bc, c.
///
/// Trabaja por caracteres, así un input multi-byte nunca se corta a la mitad.
/// Para el string vacío devuelve `[""]`.
pub fn all_substrings(s: &str) -> Vec<String> {
    if s.is_empty() {
        return vec![String::new()];
    }

    // límites en bytes de cada caracter, más el final
    let mut bounds: Vec<usize> = s.char_indices().map(|(i, _)| i).collect();
    bounds.push(s.len());

    let n = bounds.len() - 1;
    let mut out = Vec::with_capacity(n * (n + 1) / 2);

    for i in 0..n {
        for j in (i + 1)..=n {
            out.push(s[bounds[i]..bounds[j]].to_string());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(input: &str, want: &[&str]) {
        let got = all_substrings(input);
        assert_eq!(got, want, "input: {:?}", input);
    }

    #[test]
    fn casos_basicos() {
        check("a", &["a"]);
        check("ab", &["a", "ab", "b"]);
        check("abc", &["a", "ab", "abc", "b", "bc", "c"]);
    }

    /// String vacío: una única subcadena vacía.
    #[test]
    fn vacio_devuelve_un_string_vacio() {
        check("", &[""]);
    }

    #[test]
    fn caracteres_de_control_y_simbolos() {
        check("\n", &["\n"]);
        check("\t\n", &["\t", "\t\n", "\n"]);
        check("a\tb", &["a", "a\t", "a\tb", "\t", "\tb", "b"]);
        check("-!", &["-", "-!", "!"]);
        // duplicados se mantienen
        check("..", &[".", "..", "."]);
    }

    #[test]
    fn multibyte_no_se_parte() {
        check("ñé", &["ñ", "ñé", "é"]);
    }

    #[test]
    fn cantidad_es_n_por_n_mas_uno_sobre_dos() {
        let s = "abcdefghij";
        assert_eq!(all_substrings(s).len(), 10 * 11 / 2);
    }
}
