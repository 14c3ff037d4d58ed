// src/common/moeda.rs

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Formata uma entrada de preço "como digitada" no padrão pt-BR.
///
/// Os dígitos são interpretados como centavos: "1299" vira "12,99" e
/// "123456" vira "1.234,56". Qualquer caractere que não seja dígito é
/// descartado; entrada sem dígitos vira string vazia.
pub fn formatar_entrada_preco(entrada: &str) -> String {
    let digitos: String = entrada.chars().filter(|c| c.is_ascii_digit()).collect();
    if digitos.is_empty() {
        return String::new();
    }

    // Limite prático para não estourar o i64 dos centavos.
    let digitos = if digitos.len() > 15 {
        &digitos[digitos.len() - 15..]
    } else {
        &digitos[..]
    };

    let centavos: i64 = digitos.parse().unwrap_or(0);
    let valor = Decimal::new(centavos, 2);

    let reais = valor.trunc().to_i64().unwrap_or(0);
    let fracao = (centavos % 100).abs();

    format!("{},{:02}", agrupar_milhares(reais), fracao)
}

// Agrupamento de milhares com ponto, como em "1.234.567".
fn agrupar_milhares(valor: i64) -> String {
    let texto = valor.to_string();
    let mut saida = String::with_capacity(texto.len() + texto.len() / 3);
    let digitos: Vec<char> = texto.chars().collect();
    for (i, c) in digitos.iter().enumerate() {
        if i > 0 && (digitos.len() - i) % 3 == 0 {
            saida.push('.');
        }
        saida.push(*c);
    }
    saida
}
