// src/parser.rs
//
// Parser da importação em massa. Recebe texto livre colado pelo usuário e
// produz candidatos a oferta, linha a linha. Uma linha malformada nunca
// derruba o restante da lista: ela é contada e descartada.
//
// Dois formatos reais são aceitos:
//   "BEATS GT — R$ 135,90"            (listas de fornecedor, travessão)
//   "Arroz Tipo 1; 4,99; KG"          (linhas separadas por ; ou ,)
// Linhas sem "R$" são cabeçalhos de seção e podem trocar a unidade
// inferida para as linhas seguintes.

use crate::models::oferta::{ProdutoImportado, Unidade};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultadoParse {
    pub produtos: Vec<ProdutoImportado>,
    pub sem_preco: u32,
    pub invalidas: u32,
}

pub fn parse_lista(texto: &str) -> ResultadoParse {
    let mut resultado = ResultadoParse::default();
    let mut unidade_inferida = Unidade::Und;

    for linha in texto.trim().split('\n') {
        let linha = linha.trim();
        if linha.is_empty() {
            continue;
        }

        // Cabeçalho de seção: sem marcador de moeda e sem delimitadores de
        // campos. Linhas delimitadas dispensam o "R$" ("Produto X; 10,00").
        if !linha.contains("R$") && !linha.contains(';') && !linha.contains(',') {
            unidade_inferida = inferir_unidade_de_cabecalho(linha, unidade_inferida);
            continue;
        }

        if linha.contains('—') && linha.contains("R$") {
            // Formato "PRODUTO — R$ PREÇO": divide no primeiro travessão.
            let mut partes = linha.splitn(2, '—').map(str::trim);
            let nome = partes.next().unwrap_or_default();
            match partes.next() {
                Some(resto) => match extrair_preco(resto) {
                    Some(preco) => resultado.produtos.push(ProdutoImportado {
                        product_name: nome.to_string(),
                        price: preco,
                        unit: unidade_inferida,
                        selected: true,
                    }),
                    None => resultado.sem_preco += 1,
                },
                None => resultado.invalidas += 1,
            }
        } else {
            // Formato "Nome; Preço; Unidade". A vírgula só delimita quando a
            // linha não usa ponto e vírgula, senão ela quebraria o preço.
            let delimitador = if linha.contains(';') { ';' } else { ',' };
            let partes: Vec<&str> = linha.split(delimitador).map(str::trim).collect();

            if partes.len() >= 2 {
                let preco = partes[1];
                if preco.is_empty() {
                    resultado.sem_preco += 1;
                    continue;
                }

                let unidade = partes
                    .get(2)
                    .and_then(|codigo| codigo.parse::<Unidade>().ok())
                    .unwrap_or(unidade_inferida);

                resultado.produtos.push(ProdutoImportado {
                    product_name: partes[0].to_string(),
                    price: preco.to_string(),
                    unit: unidade,
                    selected: true,
                });
            } else {
                resultado.invalidas += 1;
            }
        }
    }

    resultado
}

/// Cabeçalhos de seção trocam a unidade inferida para as linhas seguintes.
/// Sem token reconhecido, a unidade atual é mantida.
pub fn inferir_unidade_de_cabecalho(cabecalho: &str, atual: Unidade) -> Unidade {
    let maiusculo = cabecalho.to_uppercase();
    if contem_palavra(&maiusculo, "CAIXA") {
        Unidade::Cx
    } else if contem_palavra(&maiusculo, "LATAS") {
        Unidade::Pct
    } else if contem_palavra(&maiusculo, "FARDO") {
        Unidade::Fardo
    } else {
        atual
    }
}

// Busca de palavra inteira: os vizinhos não podem ser [A-Za-z0-9_].
fn contem_palavra(texto: &str, palavra: &str) -> bool {
    let mut base = 0;
    while let Some(pos) = texto[base..].find(palavra) {
        let inicio = base + pos;
        let fim = inicio + palavra.len();
        let antes = texto[..inicio].bytes().last();
        let depois = texto[fim..].bytes().next();
        let limite = |b: Option<u8>| match b {
            Some(c) => !(c.is_ascii_alphanumeric() || c == b'_'),
            None => true,
        };
        if limite(antes) && limite(depois) {
            return true;
        }
        base = fim;
    }
    false
}

/// Extrai o valor que segue um marcador "R$". Aceita o formato estrito com
/// milhares e dois decimais ("1.234,56") e um formato livre ("9.99", "135").
/// Retorna apenas o valor, sem o "R$".
pub fn extrair_preco(texto: &str) -> Option<String> {
    for (pos, _) in texto.match_indices("R$") {
        let resto = texto[pos + 2..].trim_start();
        if let Some(preco) = preco_estrito(resto).or_else(|| preco_livre(resto)) {
            return Some(preco);
        }
    }
    None
}

// "D{1,3}(.DDD)*,DD" — milhares com ponto e fração obrigatória de dois
// dígitos. O comprimento da cabeça recua quando os grupos não fecham.
fn preco_estrito(texto: &str) -> Option<String> {
    let b = texto.as_bytes();
    let mut cabeca_max = 0;
    while cabeca_max < 3 && cabeca_max < b.len() && b[cabeca_max].is_ascii_digit() {
        cabeca_max += 1;
    }
    if cabeca_max == 0 {
        return None;
    }

    for cabeca in (1..=cabeca_max).rev() {
        // Consome grupos ".DDD" gulosamente e recua um a um até a fração casar.
        let mut grupos = 0;
        loop {
            let fim = cabeca + (grupos + 1) * 4;
            if fim <= b.len()
                && b[cabeca + grupos * 4] == b'.'
                && b[cabeca + grupos * 4 + 1..fim].iter().all(u8::is_ascii_digit)
            {
                grupos += 1;
            } else {
                break;
            }
        }

        loop {
            let fim = cabeca + grupos * 4;
            if fim + 3 <= b.len()
                && b[fim] == b','
                && b[fim + 1].is_ascii_digit()
                && b[fim + 2].is_ascii_digit()
            {
                return Some(texto[..fim + 3].to_string());
            }
            if grupos == 0 {
                break;
            }
            grupos -= 1;
        }
    }
    None
}

// "D+([.,]D+)?" — fallback para preços soltos como "9.99" ou "135".
fn preco_livre(texto: &str) -> Option<String> {
    let b = texto.as_bytes();
    let mut fim = 0;
    while fim < b.len() && b[fim].is_ascii_digit() {
        fim += 1;
    }
    if fim == 0 {
        return None;
    }

    if fim < b.len() && (b[fim] == b'.' || b[fim] == b',') {
        let mut fracao = fim + 1;
        while fracao < b.len() && b[fracao].is_ascii_digit() {
            fracao += 1;
        }
        if fracao > fim + 1 {
            fim = fracao;
        }
    }
    Some(texto[..fim].to_string())
}
