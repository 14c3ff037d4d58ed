// src/services/export_service.rs
//
// Pipeline de exportação: monta páginas A4 com até dois cartazes,
// rasteriza cada página e entrega arquivos PNG (download) ou um PDF de
// impressão com uma imagem por página. A rasterização é estritamente
// sequencial: existe no máximo uma página em composição por vez, para
// manter o pico de memória limitado.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::{imageops, DynamicImage, Rgba, RgbaImage};

use crate::{common::error::AppError, models::oferta::Oferta};

// Folha A4 em pixels a 96 DPI, rasterizada com fator 2.
pub const A4_LARGURA_PX: u32 = 794;
pub const A4_ALTURA_PX: u32 = 1123;
pub const ESCALA_RASTER: u32 = 2;

// Ampliação do cartaz clonado dentro do seu slot.
pub const ESCALA_BADGE: f32 = 1.35;

// O download avulso de um cartaz sai em resolução tripla, sem folha.
pub const ESCALA_BADGE_AVULSO: u32 = 3;

const MARGEM_PX: u32 = 24;
const COR_FUNDO: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
const COR_DIVISOR: Rgba<u8> = Rgba([0xcc, 0xcc, 0xcc, 0xff]);
const TRACO_PX: u32 = 12;
const VAO_PX: u32 = 8;
const ESPESSURA_DIVISOR_PX: u32 = 2;

/// Limite do fluxo de impressão; cobre ambientes onde a montagem nunca
/// termina sozinha.
pub const TEMPO_LIMITE_IMPRESSAO: Duration = Duration::from_secs(10);

// DPI que faz a página rasterizada ocupar exatamente 210mm no PDF.
const DPI_IMPRESSAO: f64 = (A4_LARGURA_PX * ESCALA_RASTER) as f64 * 25.4 / 210.0;

// Tema claro forçado na cópia exportada: o tema escuro da interface ao
// vivo nunca pode vazar para o arquivo. Pares (cor do tema escuro, cor
// clara correspondente).
const PALETA_CLARA: [([u8; 3], [u8; 3]); 6] = [
    ([0x0a, 0x0a, 0x0a], [0xff, 0xff, 0xff]), // fundo
    ([0x17, 0x17, 0x17], [0xff, 0xff, 0xff]), // cartão
    ([0xed, 0xed, 0xed], [0x11, 0x18, 0x27]), // texto
    ([0x26, 0x26, 0x26], [0xe5, 0xe7, 0xeb]), // borda
    ([0x1f, 0x1f, 0x1f], [0xf3, 0xf4, 0xf6]), // apagado
    ([0xa3, 0xa3, 0xa3], [0x6b, 0x72, 0x80]), // texto apagado
];

// ---
// Layout
// ---

/// Uma página A4 de exportação: dois slots empilhados. O inferior fica
/// vazio quando a página carrega um único cartaz.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginaA4 {
    pub superior: Option<Oferta>,
    pub inferior: Option<Oferta>,
}

/// Agrupa as ofertas selecionadas em pares consecutivos; a última página
/// pode ficar com um cartaz só.
pub fn paginar(ofertas: &[Oferta]) -> Vec<PaginaA4> {
    ofertas
        .chunks(2)
        .map(|par| PaginaA4 {
            superior: par.first().cloned(),
            inferior: par.get(1).cloned(),
        })
        .collect()
}

// ---
// Colaboradores injetáveis
// ---

/// Fonte da representação visual pré-renderizada de cada cartaz (o
/// equivalente de clonar o nó já renderizado, em vez de re-renderizar).
pub trait FonteBadges: Send + Sync {
    fn badge(&self, oferta: &Oferta) -> Result<DynamicImage, AppError>;
}

/// Cartazes pré-renderizados em disco, um PNG por oferta.
pub struct BadgesEmDisco {
    diretorio: PathBuf,
}

impl BadgesEmDisco {
    pub fn novo(diretorio: impl AsRef<Path>) -> Self {
        Self {
            diretorio: diretorio.as_ref().to_path_buf(),
        }
    }
}

impl FonteBadges for BadgesEmDisco {
    fn badge(&self, oferta: &Oferta) -> Result<DynamicImage, AppError> {
        let caminho = self.diretorio.join(format!("badge-{}.png", oferta.id));
        image::open(&caminho).map_err(|_| AppError::BadgeNaoEncontrado(oferta.id.clone()))
    }
}

/// Rasteriza o layout de uma página para uma imagem. O layout é dado
/// puro; o backend é trocável (e falsificável nos testes).
pub trait Rasterizador: Send + Sync {
    fn rasterizar(
        &self,
        pagina: &PaginaA4,
        badges: &dyn FonteBadges,
    ) -> Result<RgbaImage, AppError>;
}

/// Monta o PDF de impressão a partir das páginas já rasterizadas.
pub trait MontadorPdf: Send + Sync {
    fn montar(&self, imagens: Vec<DynamicImage>) -> Result<Vec<u8>, AppError>;
}

/// Backend padrão de montagem: genpdf com as fontes de `./fonts`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MontadorGenpdf;

impl MontadorPdf for MontadorGenpdf {
    // Uma imagem por página, sangria total, quebra de página entre elas.
    fn montar(&self, imagens: Vec<DynamicImage>) -> Result<Vec<u8>, AppError> {
        let fontes = genpdf::fonts::from_files("./fonts", "Roboto", None).map_err(|_| {
            AppError::FonteNaoEncontrada("Fonte não encontrada na pasta ./fonts".to_string())
        })?;

        let mut doc = genpdf::Document::new(fontes);
        doc.set_title("Impressão A4 de ofertas");
        doc.set_paper_size(genpdf::PaperSize::A4);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(0);
        doc.set_page_decorator(decorator);

        for (i, imagem) in imagens.into_iter().enumerate() {
            if i > 0 {
                doc.push(genpdf::elements::PageBreak::new());
            }
            let elemento = genpdf::elements::Image::from_dynamic_image(imagem)
                .map_err(|e| AppError::RasterizacaoFalhou(e.to_string()))?
                .with_dpi(DPI_IMPRESSAO)
                .with_alignment(genpdf::Alignment::Center);
            doc.push(elemento);
        }

        let mut dados = Vec::new();
        doc.render(&mut dados)
            .map_err(|e| AppError::RasterizacaoFalhou(e.to_string()))?;
        Ok(dados)
    }
}

/// Backend padrão: composição direta de pixels sobre uma folha branca.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterizadorImagem;

impl Rasterizador for RasterizadorImagem {
    fn rasterizar(
        &self,
        pagina: &PaginaA4,
        badges: &dyn FonteBadges,
    ) -> Result<RgbaImage, AppError> {
        let largura = A4_LARGURA_PX * ESCALA_RASTER;
        let altura = A4_ALTURA_PX * ESCALA_RASTER;
        let margem = MARGEM_PX * ESCALA_RASTER;
        let meio = altura / 2;

        let mut folha = RgbaImage::from_pixel(largura, altura, COR_FUNDO);

        if let Some(oferta) = &pagina.superior {
            compor_slot(&mut folha, oferta, badges, margem, meio, largura, margem)?;
        }
        if let Some(oferta) = &pagina.inferior {
            compor_slot(
                &mut folha,
                oferta,
                badges,
                meio,
                altura - margem,
                largura,
                margem,
            )?;
        }

        // Página com um cartaz só mantém a régua, agora dividindo o slot
        // vazio inteiro.
        desenhar_divisor(&mut folha, meio, margem, largura);

        Ok(folha)
    }
}

// Clona o badge, força o tema claro na cópia, amplia e centraliza no slot.
fn compor_slot(
    folha: &mut RgbaImage,
    oferta: &Oferta,
    badges: &dyn FonteBadges,
    y0: u32,
    y1: u32,
    largura: u32,
    margem: u32,
) -> Result<(), AppError> {
    let mut clone = badges.badge(oferta)?.to_rgba8();
    aplicar_paleta_clara(&mut clone);

    let (bl, ba) = clone.dimensions();
    if bl == 0 || ba == 0 {
        return Err(AppError::RasterizacaoFalhou(format!(
            "badge vazio para a oferta {}",
            oferta.id
        )));
    }

    let util_l = (largura - 2 * margem) as f32;
    let util_a = (y1 - y0) as f32;
    let fator = (util_l / bl as f32).min(util_a / ba as f32) * ESCALA_BADGE;

    let nova_l = ((bl as f32 * fator) as u32).max(1);
    let nova_a = ((ba as f32 * fator) as u32).max(1);
    let ampliado = imageops::resize(&clone, nova_l, nova_a, imageops::FilterType::Triangle);

    // A ampliação pode exceder o slot; o excesso é recortado, nunca
    // invade a margem nem o slot vizinho.
    let recorte = Recorte {
        x0: margem,
        y0,
        x1: largura - margem,
        y1,
    };
    colar_centrado(folha, &ampliado, largura / 2, (y0 + y1) / 2, recorte);
    Ok(())
}

// Janela de recorte em coordenadas da folha (limites exclusivos).
struct Recorte {
    x0: u32,
    y0: u32,
    x1: u32,
    y1: u32,
}

fn aplicar_paleta_clara(imagem: &mut RgbaImage) {
    for pixel in imagem.pixels_mut() {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        if let Some((_, claro)) = PALETA_CLARA.iter().find(|(escuro, _)| *escuro == rgb) {
            pixel[0] = claro[0];
            pixel[1] = claro[1];
            pixel[2] = claro[2];
        }
    }
}

// Cola com mistura de alfa, dentro da janela de recorte.
fn colar_centrado(
    folha: &mut RgbaImage,
    imagem: &RgbaImage,
    centro_x: u32,
    centro_y: u32,
    recorte: Recorte,
) {
    let (il, ia) = imagem.dimensions();
    let x0 = centro_x as i64 - il as i64 / 2;
    let y0 = centro_y as i64 - ia as i64 / 2;

    for (x, y, pixel) in imagem.enumerate_pixels() {
        let dx = x0 + x as i64;
        let dy = y0 + y as i64;
        if dx < recorte.x0 as i64
            || dy < recorte.y0 as i64
            || dx >= recorte.x1 as i64
            || dy >= recorte.y1 as i64
        {
            continue;
        }
        let alfa = pixel[3] as u32;
        if alfa == 0 {
            continue;
        }
        let destino = folha.get_pixel_mut(dx as u32, dy as u32);
        for c in 0..3 {
            let origem = pixel[c] as u32;
            let fundo = destino[c] as u32;
            destino[c] = ((origem * alfa + fundo * (255 - alfa)) / 255) as u8;
        }
        destino[3] = 0xff;
    }
}

// Régua tracejada horizontal no meio da folha ("2px dashed #ccc").
fn desenhar_divisor(folha: &mut RgbaImage, meio: u32, margem: u32, largura: u32) {
    let traco = TRACO_PX * ESCALA_RASTER;
    let vao = VAO_PX * ESCALA_RASTER;
    let espessura = ESPESSURA_DIVISOR_PX * ESCALA_RASTER;

    for x in margem..largura.saturating_sub(margem) {
        if (x - margem) % (traco + vao) < traco {
            for dy in 0..espessura {
                folha.put_pixel(x, meio + dy, COR_DIVISOR);
            }
        }
    }
}

// ---
// Serviço
// ---

#[derive(Debug, Clone)]
pub struct ArquivoPagina {
    pub nome: String,
    pub dados: Vec<u8>,
}

pub struct ExportService {
    rasterizador: Arc<dyn Rasterizador>,
    badges: Arc<dyn FonteBadges>,
    montador: Arc<dyn MontadorPdf>,
    diretorio_saida: PathBuf,
}

impl ExportService {
    pub fn new(
        rasterizador: Arc<dyn Rasterizador>,
        badges: Arc<dyn FonteBadges>,
        montador: Arc<dyn MontadorPdf>,
        diretorio_saida: impl AsRef<Path>,
    ) -> Self {
        Self {
            rasterizador,
            badges,
            montador,
            diretorio_saida: diretorio_saida.as_ref().to_path_buf(),
        }
    }

    /// Download: um PNG por página A4, gravado em sequência no diretório
    /// de saída com os nomes `ofertas-a4-pagina-N.png`. As páginas saem
    /// na ordem da seleção.
    pub async fn baixar(&self, ofertas: Vec<Oferta>) -> Result<Vec<String>, AppError> {
        if ofertas.is_empty() {
            return Err(AppError::NenhumaOfertaSelecionada);
        }

        tokio::fs::create_dir_all(&self.diretorio_saida)
            .await
            .map_err(anyhow::Error::from)?;

        let mut nomes = Vec::new();
        for (indice, pagina) in paginar(&ofertas).into_iter().enumerate() {
            // Uma página por vez: compõe, rasteriza, grava e descarta
            // antes de começar a próxima.
            let png = self.rasterizar_pagina(pagina).await?;
            let nome = format!("ofertas-a4-pagina-{}.png", indice + 1);
            tokio::fs::write(self.diretorio_saida.join(&nome), &png)
                .await
                .map_err(anyhow::Error::from)?;
            nomes.push(nome);
        }

        tracing::info!("{} página(s) A4 gravadas em {:?}", nomes.len(), self.diretorio_saida);
        Ok(nomes)
    }

    /// Impressão: todas as páginas rasterizadas viram um PDF com uma
    /// imagem A4 sem margens por página. Página que falhar na
    /// rasterização é pulada, como uma imagem que não carregou; a
    /// montagem inteira respeita o tempo-limite de descarte.
    pub async fn imprimir(&self, ofertas: Vec<Oferta>) -> Result<Vec<u8>, AppError> {
        if ofertas.is_empty() {
            return Err(AppError::NenhumaOfertaSelecionada);
        }

        let mut imagens = Vec::new();
        for pagina in paginar(&ofertas) {
            match self.rasterizar_pagina_crua(pagina).await {
                Ok(raster) => imagens.push(DynamicImage::ImageRgba8(raster)),
                Err(e) => tracing::warn!("Página pulada na impressão: {}", e),
            }
        }

        if imagens.is_empty() {
            return Err(AppError::RasterizacaoFalhou(
                "nenhuma página pôde ser rasterizada".to_string(),
            ));
        }

        let montador = self.montador.clone();
        let montagem =
            tokio::time::timeout(TEMPO_LIMITE_IMPRESSAO, tokio::task::spawn_blocking(move || {
                montador.montar(imagens)
            }))
            .await;

        match montagem {
            Err(_) => Err(AppError::ImpressaoExpirada),
            Ok(Err(e)) => Err(AppError::RasterizacaoFalhou(e.to_string())),
            Ok(Ok(resultado)) => resultado,
        }
    }

    /// Download avulso do cartaz de uma única oferta: só o cartaz, em
    /// resolução tripla e tema claro, sem folha nem régua.
    pub async fn baixar_badge(&self, oferta: Oferta) -> Result<ArquivoPagina, AppError> {
        let nome = format!("oferta-{}.png", slug(&oferta.product_name));
        let badges = self.badges.clone();

        let dados = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
            let mut clone = badges.badge(&oferta)?.to_rgba8();
            aplicar_paleta_clara(&mut clone);

            let (l, a) = clone.dimensions();
            if l == 0 || a == 0 {
                return Err(AppError::RasterizacaoFalhou(format!(
                    "badge vazio para a oferta {}",
                    oferta.id
                )));
            }

            let ampliado = imageops::resize(
                &clone,
                l * ESCALA_BADGE_AVULSO,
                a * ESCALA_BADGE_AVULSO,
                imageops::FilterType::Triangle,
            );
            codificar_png(ampliado)
        })
        .await
        .map_err(|e| AppError::RasterizacaoFalhou(e.to_string()))??;

        Ok(ArquivoPagina { nome, dados })
    }

    async fn rasterizar_pagina(&self, pagina: PaginaA4) -> Result<Vec<u8>, AppError> {
        let raster = self.rasterizar_pagina_crua(pagina).await?;
        codificar_png(raster)
    }

    // Rasterização em thread de bloqueio: composição de imagem é CPU puro.
    async fn rasterizar_pagina_crua(&self, pagina: PaginaA4) -> Result<RgbaImage, AppError> {
        let rasterizador = self.rasterizador.clone();
        let badges = self.badges.clone();
        tokio::task::spawn_blocking(move || rasterizador.rasterizar(&pagina, badges.as_ref()))
            .await
            .map_err(|e| AppError::RasterizacaoFalhou(e.to_string()))?
    }
}

fn codificar_png(raster: RgbaImage) -> Result<Vec<u8>, AppError> {
    let mut dados = Vec::new();
    DynamicImage::ImageRgba8(raster)
        .write_to(&mut dados, image::ImageOutputFormat::Png)
        .map_err(|e| AppError::RasterizacaoFalhou(e.to_string()))?;
    Ok(dados)
}

// "Refrigerante Coca-Cola 2L" vira "refrigerante-coca-cola-2l".
fn slug(nome: &str) -> String {
    nome.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::oferta::Unidade;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn oferta(nome: &str) -> Oferta {
        Oferta::nova(nome, "9,99", Unidade::Und, None)
    }

    fn ofertas(n: usize) -> Vec<Oferta> {
        (0..n).map(|i| oferta(&format!("Produto {}", i))).collect()
    }

    /// Badge sólido de uma cor fixa, para inspecionar a composição.
    struct BadgeSolido {
        cor: [u8; 3],
    }

    impl FonteBadges for BadgeSolido {
        fn badge(&self, _oferta: &Oferta) -> Result<DynamicImage, AppError> {
            let img = RgbaImage::from_pixel(
                600,
                400,
                Rgba([self.cor[0], self.cor[1], self.cor[2], 0xff]),
            );
            Ok(DynamicImage::ImageRgba8(img))
        }
    }

    struct BadgeAusente;

    impl FonteBadges for BadgeAusente {
        fn badge(&self, oferta: &Oferta) -> Result<DynamicImage, AppError> {
            Err(AppError::BadgeNaoEncontrado(oferta.id.clone()))
        }
    }

    /// Rasterizador mínimo para exercitar o serviço sem custo de CPU.
    struct RasterizadorFalso;

    impl Rasterizador for RasterizadorFalso {
        fn rasterizar(
            &self,
            pagina: &PaginaA4,
            badges: &dyn FonteBadges,
        ) -> Result<RgbaImage, AppError> {
            if let Some(oferta) = &pagina.superior {
                badges.badge(oferta)?;
            }
            if let Some(oferta) = &pagina.inferior {
                badges.badge(oferta)?;
            }
            Ok(RgbaImage::from_pixel(2, 2, COR_FUNDO))
        }
    }

    /// Montador que só registra quantas páginas recebeu.
    #[derive(Default)]
    struct MontadorFalso {
        paginas: AtomicUsize,
    }

    impl MontadorPdf for MontadorFalso {
        fn montar(&self, imagens: Vec<DynamicImage>) -> Result<Vec<u8>, AppError> {
            self.paginas.store(imagens.len(), Ordering::SeqCst);
            Ok(b"%PDF-falso".to_vec())
        }
    }

    fn servico_falso(badges: Arc<dyn FonteBadges>) -> (ExportService, PathBuf) {
        servico_com_montador(badges, Arc::new(MontadorFalso::default()))
    }

    fn servico_com_montador(
        badges: Arc<dyn FonteBadges>,
        montador: Arc<dyn MontadorPdf>,
    ) -> (ExportService, PathBuf) {
        let dir = std::env::temp_dir().join(format!("ofertas-export-{}", uuid::Uuid::new_v4()));
        let service = ExportService::new(Arc::new(RasterizadorFalso), badges, montador, &dir);
        (service, dir)
    }

    #[test]
    fn cinco_ofertas_viram_tres_paginas() {
        let lista = ofertas(5);
        let paginas = paginar(&lista);
        assert_eq!(paginas.len(), 3);
        assert_eq!(paginas[0].superior.as_ref().unwrap().id, lista[0].id);
        assert_eq!(paginas[0].inferior.as_ref().unwrap().id, lista[1].id);
        // A última página fica com um cartaz só, slot inferior vazio.
        assert_eq!(paginas[2].superior.as_ref().unwrap().id, lista[4].id);
        assert_eq!(paginas[2].inferior, None);
    }

    #[test]
    fn rasterizacao_tem_dimensoes_a4_e_divisor() {
        let pagina = PaginaA4 {
            superior: Some(oferta("Coca")),
            inferior: None,
        };
        let badges = BadgeSolido { cor: [0xdc, 0x26, 0x26] };
        let folha = RasterizadorImagem.rasterizar(&pagina, &badges).unwrap();

        assert_eq!(folha.dimensions(), (1588, 2246));

        let margem = MARGEM_PX * ESCALA_RASTER;
        let meio = 2246 / 2;
        // Primeiro pixel do primeiro traço; depois do traço vem o vão.
        assert_eq!(*folha.get_pixel(margem, meio), COR_DIVISOR);
        assert_eq!(
            *folha.get_pixel(margem + TRACO_PX * ESCALA_RASTER, meio),
            COR_FUNDO
        );
        // Cantos continuam no fundo branco.
        assert_eq!(*folha.get_pixel(0, 0), COR_FUNDO);
    }

    #[test]
    fn paleta_clara_e_aplicada_ao_clone() {
        let pagina = PaginaA4 {
            superior: Some(oferta("Coca")),
            inferior: None,
        };
        // Badge renderizado com o texto do tema escuro.
        let badges = BadgeSolido { cor: [0xed, 0xed, 0xed] };
        let folha = RasterizadorImagem.rasterizar(&pagina, &badges).unwrap();

        let margem = MARGEM_PX * ESCALA_RASTER;
        let centro_superior = (margem + 2246 / 2) / 2;
        let pixel = folha.get_pixel(1588 / 2, centro_superior);
        assert_eq!([pixel[0], pixel[1], pixel[2]], [0x11, 0x18, 0x27]);
    }

    #[test]
    fn cor_fora_da_paleta_nao_muda() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0xdc, 0x26, 0x26, 0xff]));
        aplicar_paleta_clara(&mut img);
        assert_eq!(*img.get_pixel(0, 0), Rgba([0xdc, 0x26, 0x26, 0xff]));
    }

    #[tokio::test]
    async fn baixar_sem_selecao_avisa_e_nao_exporta() {
        let (service, dir) = servico_falso(Arc::new(BadgeSolido { cor: [0, 0, 0] }));
        let erro = service.baixar(Vec::new()).await;
        assert!(matches!(erro, Err(AppError::NenhumaOfertaSelecionada)));
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn baixar_grava_uma_pagina_por_par_em_ordem() {
        let (service, dir) = servico_falso(Arc::new(BadgeSolido { cor: [0, 0, 0] }));
        let nomes = service.baixar(ofertas(5)).await.unwrap();

        assert_eq!(
            nomes,
            vec![
                "ofertas-a4-pagina-1.png",
                "ofertas-a4-pagina-2.png",
                "ofertas-a4-pagina-3.png"
            ]
        );
        for nome in &nomes {
            assert!(dir.join(nome).exists());
        }

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn badge_ausente_aborta_o_download() {
        let (service, dir) = servico_falso(Arc::new(BadgeAusente));
        let erro = service.baixar(ofertas(1)).await;
        assert!(matches!(erro, Err(AppError::BadgeNaoEncontrado(_))));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn imprimir_sem_nenhuma_pagina_rasterizavel_falha() {
        let (service, _dir) = servico_falso(Arc::new(BadgeAusente));
        let erro = service.imprimir(ofertas(3)).await;
        assert!(matches!(erro, Err(AppError::RasterizacaoFalhou(_))));
    }

    #[tokio::test]
    async fn imprimir_monta_uma_pagina_por_imagem_rasterizada() {
        let montador = Arc::new(MontadorFalso::default());
        let (service, _dir) =
            servico_com_montador(Arc::new(BadgeSolido { cor: [0, 0, 0] }), montador.clone());

        // 5 ofertas viram 3 páginas; o PDF recebe uma imagem por página.
        let pdf = service.imprimir(ofertas(5)).await.unwrap();
        assert!(!pdf.is_empty());
        assert_eq!(montador.paginas.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn baixar_badge_usa_nome_do_produto() {
        let (service, _dir) = servico_falso(Arc::new(BadgeSolido { cor: [0, 0, 0] }));
        let arquivo = service
            .baixar_badge(oferta("Refrigerante Coca-Cola 2L"))
            .await
            .unwrap();
        assert_eq!(arquivo.nome, "oferta-refrigerante-coca-cola-2l.png");
        assert!(!arquivo.dados.is_empty());
    }

    #[tokio::test]
    async fn baixar_badge_entrega_so_o_cartaz_em_resolucao_tripla() {
        // Cartaz com a cor de texto do tema escuro.
        let (service, _dir) = servico_falso(Arc::new(BadgeSolido { cor: [0xed, 0xed, 0xed] }));
        let arquivo = service.baixar_badge(oferta("Coca")).await.unwrap();

        let img = image::load_from_memory(&arquivo.dados).unwrap().to_rgba8();
        // O cartaz de 600×400 sai sozinho, triplicado: nada de folha A4.
        assert_eq!(img.dimensions(), (1800, 1200));
        // Tema claro aplicado e nenhum pixel da régua tracejada.
        let pixel = img.get_pixel(900, 600);
        assert_eq!([pixel[0], pixel[1], pixel[2]], [0x11, 0x18, 0x27]);
        assert!(img.pixels().all(|p| *p != COR_DIVISOR));
    }

    #[test]
    fn slug_normaliza_espacos_e_caixa() {
        assert_eq!(slug("  BEATS   GT  "), "beats-gt");
    }
}
